//! Section organization by work stream

use std::collections::HashMap;

use timeline_core::{ScheduledItem, Section};

/// Group bar items into sections, keeping first-seen stream and item order
pub fn organize_sections(items: Vec<ScheduledItem>) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items {
        let i = match index.get(&item.work_stream) {
            Some(&i) => i,
            None => {
                index.insert(item.work_stream.clone(), sections.len());
                sections.push(Section::new(item.work_stream.clone()));
                sections.len() - 1
            }
        };
        sections[i].items.push(item);
    }

    sections.retain(|s| !s.is_empty());
    sections
}
