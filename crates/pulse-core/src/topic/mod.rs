//! Topic tree and event accumulation.
//!
//! Topics form a forest linked by parent pointers. The tree is kept as a flat,
//! insertion-ordered list, the same shape it has on disk:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       TopicTree                          │
//! │  ┌─────────────┐  ┌──────────────┐  ┌─────────────────┐  │
//! │  │    CRUD     │  │  navigation  │  │  accumulation   │  │
//! │  │ add / edit  │  │ children /   │  │ record_update   │  │
//! │  │ focus/delete│  │ outline      │  │ (events, srcs)  │  │
//! │  └─────────────┘  └──────────────┘  └─────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod events;
mod tree;

pub use events::*;
pub use tree::*;
