//! `fxquinox-core`: typed production entities for the fxquinox pipeline.
//!
//! Turns loosely typed records from a ShotGrid-style tracking query into a
//! tree of typed entities (project, episodes, sequences, shots, assets,
//! tasks, publishes, versions) and answers "latest publish/version for this
//! step" lookups over them.
//!
//! The crate does no I/O. It reports through `tracing` and leaves
//! subscriber set-up to the binary that embeds it.

pub mod entity;
pub mod error;
pub mod project;
pub mod raw;
pub mod search;
pub mod step;
pub mod types;
pub mod user;

pub use entity::{
    Asset, AssetInstance, Cut, EditRange, Entity, EntityBase, EntityType, Episode, ParentRef,
    Playlist, Publish, Sequence, Shot, ShotFrames, Task, Version,
};
pub use error::{CoreError, CoreResult};
pub use project::Project;
pub use search::{PublishQuery, VersionQuery};
pub use step::Step;
pub use user::{Note, User};
