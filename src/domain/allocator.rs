use std::collections::{HashMap, HashSet};

use crate::{
    common::money::{Money, Percentage},
    domain::{expense::Split, member::MemberId},
};

/// Inputs driving the split allocator while an expense is being composed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocatorEvent {
    /// Start over with every member active and an even split of `total`.
    Initialize { members: Vec<MemberId>, total: Money },
    /// The expense total changed; the active set is split evenly again.
    SetTotal(Money),
    Remove(MemberId),
    AddBack(MemberId),
    /// Free-form text typed into a member's percentage field. Not range checked.
    EditPercentage { member: MemberId, text: String },
    /// The member's percentage field lost focus: apply its draft text.
    CommitPercentage { member: MemberId },
}

/// Percentage-based split of one expense among its participants.
///
/// The allocator is a state machine driven by [`AllocatorEvent`]s. Structural
/// changes (initialisation, a new total, removing or re-adding a participant)
/// redistribute evenly and forget every lock. Committing a percentage locks that
/// participant and spreads what is left over the participants that are not
/// locked. No event can fail: bad input is clamped or defaulted.
///
/// # Examples
///
/// ```
/// use roomie_ledger::common::money::{Money, Percentage};
/// use roomie_ledger::domain::allocator::SplitAllocator;
/// use roomie_ledger::domain::member::MemberId;
///
/// let (a, b) = (MemberId::new("a"), MemberId::new("b"));
/// let alloc = SplitAllocator::new(vec![a.clone(), b.clone()], Money::from_cents(10_000))
///     .commit(&a, "70");
///
/// let other = alloc.split(&b).unwrap();
/// assert_eq!(other.percentage, Percentage::from_whole(30));
/// assert_eq!(other.amount, Money::from_cents(3_000));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitAllocator {
    total: Money,
    members: Vec<MemberId>,
    active: Vec<MemberId>,
    locked: HashSet<MemberId>,
    /// One entry per active participant, in active order.
    splits: Vec<Split>,
    drafts: HashMap<MemberId, String>,
}

impl SplitAllocator {
    pub fn new(members: Vec<MemberId>, total: Money) -> Self {
        Self::default().apply(AllocatorEvent::Initialize { members, total })
    }

    /// The transition function.
    pub fn apply(mut self, event: AllocatorEvent) -> Self {
        match event {
            AllocatorEvent::Initialize { members, total } => {
                self.total = total;
                self.active = members.clone();
                self.members = members;
                self.distribute_evenly();
            }
            AllocatorEvent::SetTotal(total) => {
                self.total = total;
                self.distribute_evenly();
            }
            AllocatorEvent::Remove(member) => {
                if self.is_active(&member) && self.can_remove() {
                    self.active.retain(|id| *id != member);
                    self.distribute_evenly();
                }
            }
            AllocatorEvent::AddBack(member) => {
                if self.members.contains(&member) && !self.is_active(&member) {
                    self.active.push(member);
                    self.distribute_evenly();
                }
            }
            AllocatorEvent::EditPercentage { member, text } => {
                if self.is_active(&member) && is_draft_text(&text) {
                    self.drafts.insert(member, text);
                }
            }
            AllocatorEvent::CommitPercentage { member } => {
                if self.is_active(&member) {
                    let value = Percentage::parse_lenient(self.draft(&member));
                    self.recalculate(&member, value);
                }
            }
        }
        self
    }

    /// Types `text` into the member's field and commits it.
    pub fn commit(self, member: &MemberId, text: &str) -> Self {
        self.apply(AllocatorEvent::EditPercentage {
            member: member.clone(),
            text: text.to_string(),
        })
        .apply(AllocatorEvent::CommitPercentage {
            member: member.clone(),
        })
    }

    pub fn remove(self, member: &MemberId) -> Self {
        self.apply(AllocatorEvent::Remove(member.clone()))
    }

    pub fn add_back(self, member: &MemberId) -> Self {
        self.apply(AllocatorEvent::AddBack(member.clone()))
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn active(&self) -> &[MemberId] {
        &self.active
    }

    pub fn is_active(&self, member: &MemberId) -> bool {
        self.active.contains(member)
    }

    pub fn is_locked(&self, member: &MemberId) -> bool {
        self.locked.contains(member)
    }

    /// At least one participant always stays in the split.
    pub fn can_remove(&self) -> bool {
        self.active.len() > 1
    }

    /// The member an "add person back" action would re-include.
    pub fn first_inactive(&self) -> Option<&MemberId> {
        self.members.iter().find(|id| !self.is_active(id))
    }

    pub fn splits(&self) -> &[Split] {
        &self.splits
    }

    pub fn split(&self, member: &MemberId) -> Option<&Split> {
        self.splits.iter().find(|s| s.member == *member)
    }

    pub fn into_splits(self) -> Vec<Split> {
        self.splits
    }

    /// Current text of the member's percentage field.
    pub fn draft(&self, member: &MemberId) -> &str {
        self.drafts.get(member).map(String::as_str).unwrap_or("")
    }

    pub fn total_percentage(&self) -> Percentage {
        self.splits.iter().map(|s| s.percentage).sum()
    }

    fn percentage_of(&self, member: &MemberId) -> Percentage {
        self.split(member).map(|s| s.percentage).unwrap_or_default()
    }

    fn distribute_evenly(&mut self) {
        self.locked.clear();
        let count = self.active.len();
        let percentage = Percentage::share_of(Percentage::FULL.as_hundredths(), count);
        let amount = self.total.mul_ratio(1, count as i64);
        self.splits = self
            .active
            .iter()
            .map(|id| Split::new(id.clone(), amount, percentage))
            .collect();
        self.sync_drafts();
    }

    fn recalculate(&mut self, changed: &MemberId, requested: Percentage) {
        self.locked.insert(changed.clone());

        let others = self.active.iter().filter(|id| *id != changed);
        let locked_sum: Percentage = others
            .clone()
            .filter(|id| self.is_locked(id))
            .map(|id| self.percentage_of(id))
            .sum();
        let unlocked = others.filter(|id| !self.is_locked(id)).count();

        // Existing locks win over the value just typed.
        let (edited, remaining) = if Percentage::FULL - requested < locked_sum {
            (
                (Percentage::FULL - locked_sum).max(Percentage::ZERO),
                Percentage::ZERO,
            )
        } else {
            (requested, Percentage::FULL - requested - locked_sum)
        };

        let full = Percentage::FULL.as_hundredths();
        let splits = self
            .active
            .iter()
            .map(|id| {
                if id == changed {
                    Split::new(id.clone(), self.total.percent(edited), edited)
                } else if self.is_locked(id) {
                    let pct = self.percentage_of(id);
                    Split::new(id.clone(), self.total.percent(pct), pct)
                } else {
                    let amount = self
                        .total
                        .mul_ratio(remaining.as_hundredths(), unlocked as i64 * full);
                    let pct = Percentage::share_of(remaining.as_hundredths(), unlocked);
                    Split::new(id.clone(), amount, pct)
                }
            })
            .collect();

        self.splits = splits;
        self.sync_drafts();
    }

    fn sync_drafts(&mut self) {
        self.drafts = self
            .splits
            .iter()
            .map(|s| (s.member.clone(), s.percentage.to_string()))
            .collect();
    }
}

/// Digits with at most one decimal point; empty while the field is cleared.
fn is_draft_text(text: &str) -> bool {
    text.chars().all(|c| c.is_ascii_digit() || c == '.') && text.matches('.').count() <= 1
}
