//! UI / rendering layer: everything that touches Ratatui widgets.
//!
//! This layer takes the laid-out document and turns it into cells on the
//! terminal.  Nothing here mutates the document.

pub mod layout;
pub mod page_view;
pub mod progress_bar;
pub mod theme;
