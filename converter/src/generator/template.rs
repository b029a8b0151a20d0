//! Line templates for the serialized object dump.

use sketchcore::prelude::MarkerSet;

pub const HEADER: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
    "<java version=\"1.6.0\" class=\"java.beans.XMLDecoder\">\n",
    " <object class=\"java.util.ArrayList\">\n",
);

pub const FOOTER: &str = " </object>\n</java>\n";

fn pad(depth: usize) -> String {
    " ".repeat(depth)
}

fn property(out: &mut String, depth: usize, marker: &str, tag: &str, value: &str) {
    out.push_str(&format!("{}{}\n", pad(depth), marker));
    out.push_str(&format!("{}<{tag}>{value}</{tag}>\n", pad(depth + 1)));
    out.push_str(&format!("{}</void>\n", pad(depth)));
}

/// One point object inside a stroke's point list.
pub fn point(out: &mut String, markers: &MarkerSet, time: i64, x: f64, y: f64) {
    out.push_str("       <void method=\"add\">\n");
    out.push_str("        <object class=\"org.ladder.core.sketch.Point\">\n");
    property(out, 9, &markers.property_time, &markers.time_tag, &time.to_string());
    property(out, 9, &markers.property_x, &markers.coordinate_tag, &format!("{x:?}"));
    property(out, 9, &markers.property_y, &markers.coordinate_tag, &format!("{y:?}"));
    out.push_str("        </object>\n");
    out.push_str("       </void>\n");
}

/// Opens a stroke-finished event wrapping one stroke object.
pub fn open_stroke(out: &mut String, markers: &MarkerSet) {
    out.push_str("  <void method=\"add\">\n");
    out.push_str(&format!("   <object class=\"{}\">\n", markers.stroke_finished));
    out.push_str("    <void property=\"stroke\">\n");
    out.push_str(&format!("     <object class=\"{}\">\n", markers.stroke_class));
    out.push_str("      <void property=\"points\">\n");
}

pub fn close_stroke(out: &mut String) {
    out.push_str("      </void>\n");
    out.push_str("     </object>\n");
    out.push_str("    </void>\n");
    out.push_str("   </object>\n");
    out.push_str("  </void>\n");
}

pub fn sketch_finished(out: &mut String, markers: &MarkerSet) {
    out.push_str("  <void method=\"add\">\n");
    out.push_str(&format!(
        "   <object class=\"info.sift.dg.ca.datamodel.{}\"/>\n",
        markers.sketch_finished
    ));
    out.push_str("  </void>\n");
}
