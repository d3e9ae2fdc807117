use crate::{labels, CharacterId, Constants, Roster, SkillNode, SkillTag};

/// After a parry, swaps the parrying character's next APL pick for its
/// assist follow-up while the window is open.
#[derive(Debug, Clone)]
pub struct ParryAidStrategy {
    window_ticks: u64,
    latest_parry: Option<(CharacterId, u64)>,
}

impl ParryAidStrategy {
    pub fn new(window_ticks: u64) -> Self {
        Self {
            window_ticks,
            latest_parry: None,
        }
    }

    pub fn update_myself(&mut self, node: &SkillNode, tick: u64) {
        if node.has_label(labels::PARRY) {
            self.latest_parry = Some((node.char_id(), tick));
        } else if node.has_label(labels::ASSIST_FOLLOW_UP)
            && self.latest_parry.is_some_and(|(c, _)| c == node.char_id())
        {
            self.latest_parry = None;
        }
    }

    pub fn latest_parry(&self) -> Option<(CharacterId, u64)> {
        self.latest_parry
    }

    pub fn reset_myself(&mut self) {
        self.latest_parry = None;
    }

    pub fn substitute(&self, tag: &SkillTag, tick: u64, roster: &Roster) -> Option<SkillTag> {
        let (char_id, parried_at) = self.latest_parry?;
        if tick >= parried_at + self.window_ticks || tag.actor_id() != Some(char_id) {
            return None;
        }
        let follow_up = SkillTag(format!("{char_id}_{}", labels::ASSIST_FOLLOW_UP));
        if &follow_up == tag {
            return None;
        }
        roster.skill(&follow_up).map(|def| def.tag.clone())
    }
}

/// Registered action-replacement strategies, consulted by the APL engine and
/// notified of every committed action.
#[derive(Debug, Clone)]
pub struct ActionReplaceManager {
    pub parry_aid_strategy: ParryAidStrategy,
}

impl ActionReplaceManager {
    pub fn new(constants: &Constants) -> Self {
        Self {
            parry_aid_strategy: ParryAidStrategy::new(constants.parry_aid_window_ticks),
        }
    }

    pub fn update(&mut self, node: &SkillNode, tick: u64) {
        self.parry_aid_strategy.update_myself(node, tick);
    }

    pub fn replace(&self, tag: &SkillTag, tick: u64, roster: &Roster) -> Option<SkillTag> {
        self.parry_aid_strategy.substitute(tag, tick, roster)
    }

    pub fn reset(&mut self) {
        self.parry_aid_strategy.reset_myself();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::base_content;

    fn node(roster: &Roster, tag: &str) -> SkillNode {
        let tag = SkillTag::from(tag);
        let def = roster.skill(&tag).unwrap();
        SkillNode::from_def(def, tag.actor_id().unwrap(), 0, true)
    }

    #[test]
    fn test_parry_opens_follow_up_window() {
        let roster = Roster::from_defs(&base_content().characters);
        let mut strategy = ParryAidStrategy::new(60);
        strategy.update_myself(&node(&roster, "7_parry"), 100);

        let basic = SkillTag::from("7_basic");
        assert_eq!(
            strategy.substitute(&basic, 120, &roster),
            Some(SkillTag::from("7_assist_follow_up"))
        );
        assert_eq!(strategy.substitute(&basic, 160, &roster), None);
        // Other characters are unaffected.
        assert_eq!(strategy.substitute(&SkillTag::from("11_basic"), 120, &roster), None);
    }

    #[test]
    fn test_follow_up_closes_window() {
        let roster = Roster::from_defs(&base_content().characters);
        let mut strategy = ParryAidStrategy::new(60);
        strategy.update_myself(&node(&roster, "7_parry"), 100);
        strategy.update_myself(&node(&roster, "7_assist_follow_up"), 110);
        assert_eq!(strategy.latest_parry(), None);
    }

    #[test]
    fn test_no_follow_up_skill_means_no_substitution() {
        let roster = Roster::from_defs(&base_content().characters);
        let mut strategy = ParryAidStrategy::new(60);
        let mut def = crate::test_fixtures::skill("11_counter", 10, 0);
        def.labels.push(labels::PARRY.to_string());
        strategy.update_myself(&SkillNode::from_def(&def, CharacterId(11), 0, true), 0);
        assert_eq!(strategy.substitute(&SkillTag::from("11_basic"), 5, &roster), None);
    }
}
