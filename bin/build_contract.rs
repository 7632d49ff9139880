//! Binary for building WASM contracts from odra modules.
#![doc = "Binary for building WASM contracts from odra modules."]

#[allow(unused_imports)]
use travel_lending;

fn main() {
    // Used by the Odra build system; compilation itself is done by odra-build
}
