use serde::Serialize;

use crate::SkillTag;

/// One out-of-band request appended by a collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueuedAction {
    pub id: u64,
    pub skill_tag: SkillTag,
    pub active_generation: bool,
    pub priority: i32,
}

/// FIFO of `(skill_tag, active_generation, priority)` requests waiting for the
/// force-add engine. Anyone may append; only confirmation removes entries.
#[derive(Debug, Clone, Default)]
pub struct ExternalQueue {
    entries: Vec<QueuedAction>,
    next_id: u64,
}

impl ExternalQueue {
    /// Appends a request and returns its queue id.
    pub fn push(&mut self, skill_tag: SkillTag, active_generation: bool, priority: i32) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(QueuedAction {
            id,
            skill_tag,
            active_generation,
            priority,
        });
        id
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueuedAction> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn remove_resolved(&mut self, ids: &[u64]) {
        self.entries.retain(|entry| !ids.contains(&entry.id));
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_resolved_keeps_fifo_order() {
        let mut queue = ExternalQueue::default();
        let a = queue.push(SkillTag::from("7_basic"), true, 1);
        queue.push(SkillTag::from("11_basic"), true, 2);
        let c = queue.push(SkillTag::from("13_basic"), false, 3);
        queue.remove_resolved(&[a, c]);
        let tags: Vec<&str> = queue.iter().map(|q| q.skill_tag.as_str()).collect();
        assert_eq!(tags, vec!["11_basic"]);
        // Ids keep increasing after removal.
        assert_eq!(queue.push(SkillTag::from("7_dodge"), true, 0), 3);
    }
}
