/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Label and subroutine definitions. The source keeps these as two-word
//! records at the high end of the buffer and finds one by sorting the
//! whole region and computing its offset from the sorted index. This
//! keeps the real records in the buffer (so capacity accounting and
//! `TooManyInstructions` stay faithful to the original) but looks them up
//! through two side indices instead of sorting at `finalise()` time.

use std::collections::HashMap;

use crate::assembler::buffer::Buffer;
use crate::errors::AssemblerError;

pub const MAX_LABELS: u32 = 0xFFFF;
pub const MAX_SUBS: u32 = 0xFFFF;

const METAINFO_LABEL: u32 = 0;
const METAINFO_SUB: u32 = 1;

#[derive(Default)]
pub struct MetaInfo {
    labels: HashMap<u16, u32>,
    subs: HashMap<u16, u32>,
}

impl MetaInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define_label(
        &mut self,
        buffer: &mut Buffer,
        label: u32,
        position: u32,
    ) -> Result<(), AssemblerError> {
        if label > MAX_LABELS {
            return Err(AssemblerError::BadLabelNum { label });
        }
        let header = (label << 16) | METAINFO_LABEL;
        buffer.add_metainfo(header, position)?;
        self.labels.insert(label as u16, position);
        Ok(())
    }

    pub fn define_sub(
        &mut self,
        buffer: &mut Buffer,
        sub: u32,
        position: u32,
    ) -> Result<(), AssemblerError> {
        if sub > MAX_SUBS {
            return Err(AssemblerError::BadSubNumber { sub });
        }
        let header = (sub << 16) | METAINFO_SUB;
        buffer.add_metainfo(header, position)?;
        self.subs.insert(sub as u16, position);
        Ok(())
    }

    pub fn label_position(&self, label: u32) -> Option<u32> {
        u16::try_from(label)
            .ok()
            .and_then(|label| self.labels.get(&label))
            .copied()
    }

    pub fn sub_position(&self, sub: u32) -> Option<u32> {
        u16::try_from(sub)
            .ok()
            .and_then(|sub| self.subs.get(&sub))
            .copied()
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    pub fn sub_count(&self) -> usize {
        self.subs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_and_subs_are_looked_up_independently() {
        let mut words = [0u32; 16];
        let mut buf = Buffer::borrowed(&mut words);
        let mut meta = MetaInfo::new();
        meta.define_label(&mut buf, 3, 10).unwrap();
        meta.define_sub(&mut buf, 3, 20).unwrap();
        assert_eq!(meta.label_position(3), Some(10));
        assert_eq!(meta.sub_position(3), Some(20));
        assert_eq!(meta.label_position(4), None);
    }

    #[test]
    fn label_above_the_ceiling_is_rejected() {
        let mut words = [0u32; 16];
        let mut buf = Buffer::borrowed(&mut words);
        let mut meta = MetaInfo::new();
        assert_eq!(
            meta.define_label(&mut buf, MAX_LABELS + 1, 0).unwrap_err(),
            AssemblerError::BadLabelNum {
                label: MAX_LABELS + 1
            }
        );
    }
}
