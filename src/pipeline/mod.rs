//! Pipeline stages for renaming one directory of images.
//!
//! Each submodule implements exactly one step, so each can be tested without
//! the others.
//!
//! ## Data Flow
//!
//! ```text
//! scan ──▶ mime ──▶ llm ──▶ extract ──▶ normalize ──▶ rename
//! (dir)   (ext)   (VLM)   (text)      (name)       (fs)
//! ```
//!
//! 1. [`scan`]: list supported images in the directory
//! 2. [`mime`]: map the extension to a MIME type
//! 3. [`llm`]: upload the image and query the model; the only stage
//!    with network I/O
//! 4. [`extract`]: pick the first usable line of the response
//! 5. [`normalize`]: lowercase, hyphenate, re-attach the extension
//!
//! The final filesystem step lives in [`crate::rename`].

pub mod extract;
pub mod llm;
pub mod mime;
pub mod normalize;
pub mod scan;
