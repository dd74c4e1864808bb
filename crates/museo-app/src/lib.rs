// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod debounce;
pub mod model;
pub mod navigation;
pub mod projector;
pub mod state;

pub use debounce::*;
pub use model::*;
pub use navigation::*;
pub use projector::*;
pub use state::*;
