//! AFL fuzz harness for the collections
//!
//! Every input is decoded into a stream of add / remove / contains / clear
//! operations and replayed against all containers at once. The harness
//! crashes when:
//! 1. Any container disagrees with the reference model on a result
//! 2. Any container's contents differ from the model after an operation
//! 3. Any container's structural invariants break
//!
//! Run with `cargo afl build --features afl --bin fuzz_collections`.

use afl::fuzz;
use canopy::oracle;

fn main() {
    fuzz!(|data: &[u8]| {
        if let Err(err) = oracle::run(data) {
            panic!("oracle setup failed: {err}");
        }
    });
}
