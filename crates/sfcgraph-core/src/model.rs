//! Sequence model extracted from S7-GRAPH sources.
//!
//! A [`Sequence`] owns its [`Step`]s and [`Transition`]s. The model is built
//! once by the parser and is read-only afterwards; layout and export borrow
//! it to produce disposable derived artifacts.
//!
//! Optional source sections are modelled as [`Option`]: `None` means the
//! section was absent, which is distinct from a section that is present but
//! empty.

use std::fmt;

use serde::Serialize;

use crate::identifier::Id;

/// Text used when rendering an absent optional section.
pub const ABSENT: &str = "none";

/// One sequence declared inside a program unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sequence {
    /// Name of the owning function block.
    pub fb_name: String,
    /// Sequence name, the first line of the header comment pragma.
    pub name: String,
    /// Descriptive comment following the name in the header pragma.
    pub comment: String,
    /// Component-set identifier.
    pub cmpset: String,
    /// Raw settings block.
    pub settings: String,
    /// Raw `VAR_INPUT` block contents.
    pub var_input: Option<String>,
    /// Raw permissive condition evaluated when the sequence starts.
    pub perm_condition: Option<String>,
    /// Steps in source order.
    pub steps: Vec<Step>,
    /// Transitions in source order.
    pub transitions: Vec<Transition>,
}

impl Sequence {
    /// Looks up a step by name.
    pub fn step(&self, name: Id) -> Option<&Step> {
        self.steps.iter().find(|step| step.name == name)
    }

    /// Returns the steps declared with `INITIAL_STEP`.
    pub fn initial_steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(|step| step.initial)
    }

    /// Iterates over every `(source, destination)` pair of every transition,
    /// in declaration order, together with the owning transition's index.
    pub fn edges(&self) -> impl Iterator<Item = (usize, Id, Id)> + '_ {
        self.transitions
            .iter()
            .enumerate()
            .flat_map(|(idx, transition)| {
                transition
                    .edges()
                    .map(move |(source, target)| (idx, source, target))
            })
    }

    /// Qualified name used in reports and diagram page titles.
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.fb_name, self.name)
    }

    /// The `VAR_INPUT` text, or [`ABSENT`].
    pub fn var_input_or_absent(&self) -> &str {
        self.var_input.as_deref().unwrap_or(ABSENT)
    }

    /// The permissive condition text, or [`ABSENT`].
    pub fn perm_condition_or_absent(&self) -> &str {
        self.perm_condition.as_deref().unwrap_or(ABSENT)
    }
}

/// A named state of a sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    /// Step name, unique within the owning sequence.
    pub name: Id,
    /// Declared step number. Not guaranteed contiguous or ordered.
    pub number: u32,
    /// Step comment.
    pub comment: String,
    /// Declared with `INITIAL_STEP`.
    pub initial: bool,
    /// Raw supervision condition.
    pub supervision: Option<String>,
    /// Statement lines of the step body.
    pub condition: Option<Vec<String>>,
}

impl Step {
    /// The supervision text, or [`ABSENT`].
    pub fn supervision_or_absent(&self) -> &str {
        self.supervision.as_deref().unwrap_or(ABSENT)
    }
}

/// A guarded edge from one or more source steps to one or more destinations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
    pub name: Id,
    pub number: u32,
    pub from: Vec<Id>,
    pub to: Vec<Id>,
    /// Guard expression, kept verbatim.
    pub condition: String,
}

impl Transition {
    /// Expands the transition into one `(source, destination)` pair per
    /// combination of `from` and `to`.
    pub fn edges(&self) -> impl Iterator<Item = (Id, Id)> + '_ {
        self.from
            .iter()
            .flat_map(|&source| self.to.iter().map(move |&target| (source, target)))
    }

    /// Iterates over every step name this transition refers to.
    pub fn endpoints(&self) -> impl Iterator<Item = Id> + '_ {
        self.from.iter().chain(self.to.iter()).copied()
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.number)
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |ids: &[Id]| {
            ids.iter()
                .map(Id::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        write!(
            f,
            "{} ({}): {} -> {}",
            self.name,
            self.number,
            join(&self.from),
            join(&self.to)
        )
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn step(name: &str, number: u32) -> Step {
        Step {
            name: Id::new(name),
            number,
            comment: String::new(),
            initial: false,
            supervision: None,
            condition: None,
        }
    }

    fn transition(name: &str, from: &[&str], to: &[&str]) -> Transition {
        Transition {
            name: Id::new(name),
            number: 1,
            from: from.iter().map(|s| Id::new(s)).collect(),
            to: to.iter().map(|s| Id::new(s)).collect(),
            condition: "TRUE".to_string(),
        }
    }

    fn sequence(steps: Vec<Step>, transitions: Vec<Transition>) -> Sequence {
        Sequence {
            fb_name: "FB10".to_string(),
            name: "Clamp".to_string(),
            comment: String::new(),
            cmpset: String::new(),
            settings: String::new(),
            var_input: None,
            perm_condition: None,
            steps,
            transitions,
        }
    }

    #[test]
    fn test_transition_edges_expand_lists() {
        let t = transition("T1", &["S1", "S2"], &["S3", "S4"]);
        let edges: Vec<_> = t.edges().collect();

        assert_eq!(
            edges,
            vec![
                (Id::new("S1"), Id::new("S3")),
                (Id::new("S1"), Id::new("S4")),
                (Id::new("S2"), Id::new("S3")),
                (Id::new("S2"), Id::new("S4")),
            ]
        );
    }

    #[test]
    fn test_sequence_edges_keep_transition_index() {
        let seq = sequence(
            vec![step("S1", 1), step("S2", 2), step("S3", 3)],
            vec![
                transition("T1", &["S1"], &["S2"]),
                transition("T2", &["S2"], &["S3"]),
            ],
        );

        let edges: Vec<_> = seq.edges().map(|(idx, _, _)| idx).collect();
        assert_eq!(edges, vec![0, 1]);
    }

    #[test]
    fn test_step_lookup_and_initial_steps() {
        let mut first = step("S1", 1);
        first.initial = true;
        let seq = sequence(vec![first, step("S2", 2)], vec![]);

        assert_eq!(seq.step(Id::new("S2")).map(|s| s.number), Some(2));
        assert!(seq.step(Id::new("S9")).is_none());
        assert_eq!(seq.initial_steps().count(), 1);
    }

    #[test]
    fn test_absent_sections_render_as_none() {
        let seq = sequence(vec![], vec![]);
        assert_eq!(seq.var_input_or_absent(), ABSENT);
        assert_eq!(seq.perm_condition_or_absent(), ABSENT);
        assert_eq!(step("S1", 1).supervision_or_absent(), ABSENT);
        assert_eq!(seq.qualified_name(), "FB10/Clamp");
    }

    #[test]
    fn test_transition_display() {
        let t = transition("T1", &["S1"], &["S2", "S3"]);
        assert_eq!(t.to_string(), "T1 (1): S1 -> S2, S3");
    }

    proptest! {
        #[test]
        fn edge_count_is_product_of_endpoint_counts(from in 1usize..5, to in 1usize..5) {
            let from_names: Vec<String> = (0..from).map(|i| format!("A{i}")).collect();
            let to_names: Vec<String> = (0..to).map(|i| format!("B{i}")).collect();
            let from_refs: Vec<&str> = from_names.iter().map(String::as_str).collect();
            let to_refs: Vec<&str> = to_names.iter().map(String::as_str).collect();

            let t = transition("T", &from_refs, &to_refs);
            prop_assert_eq!(t.edges().count(), from * to);
        }
    }
}
