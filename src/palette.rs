extern crate alloc;
use alloc::string::String;
use alloc::vec::Vec;

use crate::color_index::ColorIndex;
use crate::queue::{BoxOrder, PriorityQueue};
use crate::vbox::VBox;

/// Population metrics of a palette entry.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metrics {
    /// Sampled pixels represented by this color.
    pub count: u32,
    /// Volume of the color box, in 5-bit grid cells.
    pub volume: u32,
    /// `count` over all sampled pixels.
    pub ratio: f64,
}

/// One color of an extracted palette.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaletteEntry {
    pub color: rgb::RGB<u8>,
    /// Present when metrics were requested.
    pub metrics: Option<Metrics>,
}

impl PaletteEntry {
    pub fn rgb(&self) -> [u8; 3] {
        [self.color.r, self.color.g, self.color.b]
    }

    /// `0xRRGGBB`.
    pub fn packed(&self) -> u32 {
        ((self.color.r as u32) << 16) | ((self.color.g as u32) << 8) | self.color.b as u32
    }

    /// Lowercase `#rrggbb`.
    pub fn hex(&self) -> String {
        alloc::format!("#{:06x}", self.packed())
    }
}

fn entry(color: rgb::RGB<u8>, count: u32, volume: u32, total: u64, metrics: bool) -> PaletteEntry {
    PaletteEntry {
        color,
        metrics: metrics.then(|| Metrics {
            count,
            volume,
            ratio: if total == 0 {
                0.0
            } else {
                count as f64 / total as f64
            },
        }),
    }
}

/// Convert the final boxes into palette entries, greatest first under
/// `order`. Empty boxes contribute nothing.
pub fn from_boxes(
    mut queue: PriorityQueue<VBox<'_>>,
    order: BoxOrder,
    total: u64,
    metrics: bool,
) -> Vec<PaletteEntry> {
    queue.set_comparator(order.comparator());
    let mut palette = Vec::with_capacity(queue.len());
    while let Some(vbox) = queue.pop() {
        let count = vbox.count();
        if count == 0 {
            continue;
        }
        palette.push(entry(vbox.avg(), count, vbox.volume(), total, metrics));
    }
    palette
}

/// Palette made of the exact sampled colors, most frequent first.
pub fn from_exact(mut colors: Vec<(ColorIndex, u32)>, total: u64, metrics: bool) -> Vec<PaletteEntry> {
    colors.sort_by(|a, b| b.1.cmp(&a.1));
    colors
        .into_iter()
        .map(|(index, count)| {
            let [r, g, b] = index.decode();
            entry(rgb::RGB { r, g, b }, count, 1, total, metrics)
        })
        .collect()
}

/// Keep entries accepted by `filter`; if none are, keep the first entry.
pub fn retain_or_first<F>(palette: &mut Vec<PaletteEntry>, mut filter: F)
where
    F: FnMut(&PaletteEntry) -> bool,
{
    let first = palette.first().copied();
    palette.retain(|e| filter(e));
    if palette.is_empty() {
        palette.extend(first);
    }
}
