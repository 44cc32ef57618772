//! Property test for the §8 HWM invariant: for any pipe with `hwm > 0`,
//! outstanding credit never exceeds `hwm`, no matter how writes and reads
//! interleave.

use proptest::prelude::*;
use zmtp_core::pipe_pair;
use zmtp_wire::Message;

#[derive(Debug, Clone, Copy)]
enum Step {
    Write,
    Read,
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![Just(Step::Write), Just(Step::Read)]
}

proptest! {
    #[test]
    fn outstanding_never_exceeds_hwm(
        hwm in 1usize..16,
        steps in prop::collection::vec(step_strategy(), 0..200),
    ) {
        let (mut writer, mut reader) = pipe_pair(hwm, 0);

        for step in steps {
            match step {
                Step::Write => {
                    writer.write(Message::from_bytes(vec![0u8]));
                },
                Step::Read => {
                    reader.read();
                },
            }
            prop_assert!(writer.outstanding() <= hwm as u64);
        }
    }
}
