// Create the Error, ErrorKind, ResultExt, and Result types.
// Other modules `use crate::errors::*;` to get access to everything `error_chain!` creates.
#![allow(deprecated)]

error_chain! {

    errors {
        InvalidGridDimensions(width: usize, height: usize) {
            description("grid dimensions must be positive and fit u32 coordinates")
            display("invalid grid dimensions {}x{}", width, height)
        }

        InvalidCorridorBias(bias: f64) {
            description("corridor bias must be within [0, 1]")
            display("invalid corridor bias {}, expected a value within [0, 1]", bias)
        }

        MazeNotCarved {
            description("the grid has not been carved into a maze")
            display("cannot search a grid whose maze generation has not completed")
        }

        SearchInProgress {
            description("the search has not been exhausted")
            display("the path can only be built once the search steps are exhausted")
        }
    }
}
