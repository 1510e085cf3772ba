// wall clock timing of the phases of a model solve

cfg_if::cfg_if! {
    if #[cfg(target_family = "wasm")] {
        pub(crate) use web_time::Instant;
    } else {
        pub(crate) use std::time::Instant;
    }
}

mod timers;
pub(crate) use timers::*;
