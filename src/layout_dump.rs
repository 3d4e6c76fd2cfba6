use crate::config::Strategy;
use crate::layout::{FloorLayout, GenerationStats};
use crate::model::{Envelope, Footprint, SpatialUnit};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump<'a> {
    pub envelope: Envelope,
    pub room_footprint: Footprint,
    pub strategy: Strategy,
    pub stats: GenerationStats,
    pub counts: BTreeMap<String, usize>,
    pub units: &'a [SpatialUnit],
}

impl<'a> LayoutDump<'a> {
    pub fn from_layout(layout: &'a FloorLayout) -> Self {
        let counts = layout
            .counts()
            .into_iter()
            .map(|(kind, count)| (kind.label_prefix().to_ascii_lowercase(), count))
            .collect();
        LayoutDump {
            envelope: layout.envelope,
            room_footprint: layout.room,
            strategy: layout.strategy,
            stats: layout.stats,
            counts,
            units: &layout.units,
        }
    }
}

pub fn layout_to_json(layout: &FloorLayout) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&LayoutDump::from_layout(layout))?)
}

pub fn write_layout_dump(path: &Path, layout: &FloorLayout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &LayoutDump::from_layout(layout))?;
    Ok(())
}
