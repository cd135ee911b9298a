//! Property-based tests for indentation and folding state.
//!
//! These tests use proptest to generate random depths and message lists and
//! verify that the depth bookkeeping holds for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::destination::{DestinationConfig, LogDestination, SharedBuffer, Target};
    use crate::error::Error;
    use crate::logger::{Fanout, Logger};
    use crate::message::{LogMessage, FOLDING_CLOSE};
    use proptest::prelude::*;

    fn folding_dest() -> (LogDestination, SharedBuffer) {
        let buffer = SharedBuffer::new();
        let dest = LogDestination::open(
            DestinationConfig::new(Target::Buffer(buffer.clone()))
                .id("prop")
                .folding(true),
        )
        .unwrap();
        (dest, buffer)
    }

    fn count_close_markers(text: &str) -> usize {
        text.lines().filter(|line| *line == FOLDING_CLOSE).count()
    }

    // ============================================================================
    // fold / restore property tests
    // ============================================================================

    proptest! {
        /// Property: a restore emits one close marker per level opened since the snapshot
        #[test]
        fn restore_closes_exactly_the_opened_folds(before in 0usize..6, after in 0usize..10) {
            let (mut dest, buffer) = folding_dest();
            for _ in 0..before {
                dest.open_fold().unwrap();
            }
            let snapshot = dest.state();
            for _ in 0..after {
                dest.open_fold().unwrap();
            }
            buffer.clear();

            dest.restore_state(snapshot).unwrap();

            prop_assert_eq!(count_close_markers(&buffer.contents()), after);
            prop_assert_eq!(dest.folding_depth(), before);
        }

        /// Property: restoring to a deeper snapshot never emits markers or changes depth
        #[test]
        fn restore_never_goes_deeper(current in 0usize..5, extra in 1usize..5) {
            let (mut dest, buffer) = folding_dest();
            for _ in 0..current + extra {
                dest.open_fold().unwrap();
            }
            let deeper = dest.state();
            let shallow = crate::destination::DestinationState {
                indent_depth: 0,
                folding_depth: current,
            };
            dest.restore_state(shallow).unwrap();
            buffer.clear();

            let restored = dest.restore_state(deeper);
            prop_assert!(
                matches!(restored, Err(Error::StateRestore { .. })),
                "restore to a deeper snapshot was accepted"
            );
            prop_assert_eq!(buffer.contents(), "");
            prop_assert_eq!(dest.folding_depth(), current);
        }
    }

    // ============================================================================
    // scoped indent property tests
    // ============================================================================

    proptest! {
        /// Property: depths after a scope equal depths before it, whether or not the body failed
        #[test]
        fn scope_restores_depths(
            indent in 0usize..4,
            folds in 0usize..4,
            delta in 0isize..4,
            fail in any::<bool>(),
        ) {
            let buffer = SharedBuffer::new();
            let mut logger = Logger::new();
            logger
                .open_destination(
                    DestinationConfig::new(Target::Buffer(buffer.clone()))
                        .id("prop")
                        .folding(true),
                )
                .unwrap();
            {
                let dest = logger.destination_mut("prop").unwrap();
                dest.adjust_indent(indent as isize).unwrap();
                for _ in 0..folds {
                    dest.open_fold().unwrap();
                }
            }
            let before = logger.destination("prop").unwrap().state();

            let result = logger.scoped_indent(&Fanout::All, delta, &["enter".into()], |logger| -> crate::error::Result<()> {
                logger.output(&["inside".into()])?;
                if fail {
                    Err(Error::UnknownDestination { id: "boom".to_string() })
                } else {
                    Ok(())
                }
            });

            prop_assert!(result.is_ok());
            prop_assert_eq!(result.unwrap().is_err(), fail);
            prop_assert_eq!(logger.destination("prop").unwrap().state(), before);
        }
    }

    // ============================================================================
    // output property tests
    // ============================================================================

    proptest! {
        /// Property: string messages produce one line each, prefixed by the indent depth
        #[test]
        fn output_writes_one_indented_line_per_string(
            lines in prop::collection::vec("[a-zA-Z0-9 .:]{0,20}", 0..8),
            depth in 0usize..5,
        ) {
            let buffer = SharedBuffer::new();
            let mut logger = Logger::new();
            logger
                .open_destination(DestinationConfig::new(Target::Buffer(buffer.clone())).id("prop"))
                .unwrap();
            logger
                .destination_mut("prop")
                .unwrap()
                .adjust_indent(depth as isize)
                .unwrap();

            let messages: Vec<LogMessage> = lines.iter().map(|l| LogMessage::text(l.as_str())).collect();
            logger.output(&messages).unwrap();

            let contents = buffer.contents();
            let written: Vec<&str> = contents.lines().collect();
            prop_assert_eq!(written.len(), lines.len());
            let prefix = "\t".repeat(depth);
            for (line, expected) in written.iter().zip(&lines) {
                prop_assert_eq!(*line, format!("{}{}", prefix, expected));
            }
        }
    }
}
