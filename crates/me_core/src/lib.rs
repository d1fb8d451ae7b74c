pub mod init;
pub mod trace;

pub mod prelude {
    pub use cap_std::fs_utf8::Dir;
    pub use enumflags2::{self, bitflags, BitFlags};
    pub use glam::{self, uvec2, vec2, UVec2, Vec2};
    pub use indexmap::IndexMap;
    pub use itertools::Itertools;
    pub use miette;
    pub use miette::{bail, Context, Diagnostic, IntoDiagnostic, Result};
    pub use serde;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{from_reader, from_str, to_string_pretty, to_writer_pretty, Value};
    pub use smol_str::SmolStr;
    pub use std::collections::{BTreeMap, BTreeSet};
    pub use std::sync::Arc;
    pub use thiserror::{self, Error};
    pub use tracing::{
        debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
    };
}
