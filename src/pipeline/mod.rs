//! Formatting stages for exported documents.
//!
//! Every stage is a pure function over strings, so each can be tested
//! without a network or a cache.
//!
//! ## Data Flow
//!
//! ```text
//! export ──▶ normalize ──▶ byline ──▶ sections
//! (html/text)  (cleanup)    (author)   (outline)
//! ```
//!
//! 1. [`normalize`]: reduce an editor export to an embeddable body, or
//!    render a plain-text export as Markdown
//! 2. [`byline`]: detect an in-body attribution and remove it
//! 3. [`sections`]: split the body into a two-level outline
//! 4. [`format`]: run the stages above and assemble the payload
//!
//! [`names`] (title cleanup, slugs) and [`markup`] (lenient tag scanning)
//! are shared helpers.

pub mod byline;
pub mod format;
pub mod markup;
pub mod names;
pub mod normalize;
pub mod sections;
