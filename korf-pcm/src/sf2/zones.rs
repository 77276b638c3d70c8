//! Instrument and key-zone layout

use hashbrown::{HashMap, HashSet};

use crate::link::LinkResult;

/// One key zone of an instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Zone {
    /// Position of the sample in the smpl chunk (shdr index)
    pub sample_id: u16,
    pub low_key: u8,
    pub high_key: u8,
    pub root_key: u8,
}

/// One instrument (and its preset)
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Instrument {
    pub name: String,
    pub zones: Vec<Zone>,
}

/// Build instruments for the selected samples
///
/// `selected` is the export order (sample id = position). Each link result
/// with at least one selected sample becomes a keyboard-split instrument;
/// every selected sample left over gets a full-range instrument of its own.
pub(super) fn layout(
    selected: &[usize],
    names: &[&str],
    root_keys: &[u8],
    links: &[LinkResult],
) -> Vec<Instrument> {
    let ids: HashMap<usize, u16> = selected
        .iter()
        .enumerate()
        .map(|(id, &index)| (index, id as u16))
        .collect();

    let mut used: HashSet<u16> = HashSet::new();
    let mut instruments = Vec::new();

    for result in links {
        let members: Vec<u16> = result
            .samples()
            .into_iter()
            .filter_map(|index| ids.get(&index).copied())
            .collect();
        if members.is_empty() {
            continue;
        }

        used.extend(members.iter().copied());
        instruments.push(Instrument {
            name: result.program_name.clone(),
            zones: split_keyboard(&members, root_keys),
        });
    }

    for (id, name) in names.iter().enumerate() {
        let id = id as u16;
        if used.contains(&id) {
            continue;
        }
        instruments.push(Instrument {
            name: name.to_string(),
            zones: vec![Zone {
                sample_id: id,
                low_key: 0,
                high_key: 127,
                root_key: root_keys[id as usize],
            }],
        });
    }

    instruments
}

/// Spread samples over the keyboard by root key
///
/// Distinct roots split at the midpoint between neighbours; samples with
/// the same root share (layer) a range.
fn split_keyboard(members: &[u16], root_keys: &[u8]) -> Vec<Zone> {
    let mut sorted: Vec<(u8, u16)> = members
        .iter()
        .map(|&id| (root_keys[id as usize], id))
        .collect();
    sorted.sort_unstable();

    let mut roots: Vec<u8> = sorted.iter().map(|&(root, _)| root).collect();
    roots.dedup();

    let mut ranges: HashMap<u8, (u8, u8)> = HashMap::with_capacity(roots.len());
    let mut low = 0u8;
    for (i, &root) in roots.iter().enumerate() {
        let high = match roots.get(i + 1) {
            Some(&next) => ((u16::from(root) + u16::from(next)) / 2) as u8,
            None => 127,
        };
        ranges.insert(root, (low, high));
        low = high.saturating_add(1);
    }

    sorted
        .into_iter()
        .map(|(root_key, sample_id)| {
            let (low_key, high_key) = ranges[&root_key];
            Zone {
                sample_id,
                low_key,
                high_key,
                root_key,
            }
        })
        .collect()
}
