//! Graphviz export of an explored state space.
//!
//! Nodes are labelled with their index and variable values; nodes where a
//! label holds list it and are drawn with a double border. Edges carry their
//! probability.

use std::fmt::{self, Write};

use crate::explorer::{INITIAL_STATE, StateSpace};

/// Write `space` as a DOT digraph.
pub fn write_dot<S, W: Write>(space: &StateSpace<S>, out: &mut W) -> fmt::Result {
    writeln!(out, "digraph dtmc {{")?;
    writeln!(out, "  node [shape=box];")?;

    let names = space.var_names();
    for index in 0..space.len() {
        let values = space
            .values(index)
            .iter()
            .zip(names)
            .map(|(value, name)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join(",");

        let labels = space
            .label_names()
            .iter()
            .enumerate()
            .filter(|(label, _)| space.label(index, *label))
            .map(|(_, name)| *name)
            .collect::<Vec<_>>();

        write!(out, "  {index} [label=\"{index}\\n({values})")?;
        if !labels.is_empty() {
            write!(out, "\\n{{{}}}", labels.join(","))?;
        }
        write!(out, "\"")?;
        if !labels.is_empty() {
            write!(out, ", peripheries=2")?;
        }
        if index == INITIAL_STATE {
            write!(out, ", style=bold")?;
        }
        writeln!(out, "];")?;
    }

    for source in 0..space.len() {
        for t in space.transitions(source) {
            writeln!(out, "  {source} -> {} [label=\"{}\"];", t.target, t.probability)?;
        }
    }

    writeln!(out, "}}")
}

/// Render `space` as a DOT string.
pub fn to_dot<S>(space: &StateSpace<S>) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_dot(space, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use concord_core::ModelConfig;

    use super::*;
    use crate::explorer::{ExploreConfig, explore};

    #[test]
    fn renders_single_participant_round() {
        let model = ModelConfig::unanimous(1, 0.25).build().unwrap();
        let space = explore(&model, &ExploreConfig::default()).unwrap();

        let expected = "\
digraph dtmc {
  node [shape=box];
  0 [label=\"0\\n(x=0,o0=0)\", style=bold];
  1 [label=\"1\\n(x=1,o0=0)\"];
  2 [label=\"2\\n(x=1,o0=1)\\n{end}\", peripheries=2];
  0 -> 1 [label=\"0.75\"];
  0 -> 2 [label=\"0.25\"];
  1 -> 1 [label=\"1\"];
  2 -> 2 [label=\"1\"];
}
";
        assert_eq!(to_dot(&space), expected);
    }
}
