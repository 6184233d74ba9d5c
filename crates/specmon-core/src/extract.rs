//! Segment-by-header field extraction.

use crate::record::{Folder, SectionHeader, SpecRecord};

/// Turn raw document text into a structured record.
///
/// Lines are scanned in order. A line that, after trimming, exactly equals a
/// recognized header token opens that section, committing the previous
/// section's accumulated value first. Every non-header line inside an open
/// section is trimmed and folded into the value, joined by single spaces.
/// The final open section commits after the scan since no header follows it.
/// `file_name` and `folder` are stamped from the arguments regardless of
/// what the text contains.
///
/// This function is total: it never fails, it just returns a record whose
/// fields may be empty. Text before the first header is discarded.
pub fn parse_spec_text(text: &str, file_name: &str, folder: Folder) -> SpecRecord {
    let mut record = SpecRecord::default();
    let mut current: Option<SectionHeader> = None;
    let mut content = String::new();

    for line in text.split('\n') {
        let trimmed = line.trim();
        match SectionHeader::parse(trimmed) {
            Some(header) => {
                if let Some(open) = current {
                    *record.section_mut(open) = content.trim().to_owned();
                }
                current = Some(header);
                content.clear();
            }
            None => {
                if current.is_some() {
                    if !content.is_empty() {
                        content.push(' ');
                    }
                    content.push_str(trimmed);
                }
            }
        }
    }

    if let Some(open) = current {
        *record.section_mut(open) = content.trim().to_owned();
    }

    record.file_name = file_name.to_owned();
    record.folder = Some(folder);
    record
}
