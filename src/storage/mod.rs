//! Artifact storage module.
//!
//! PEM envelope encoding and persistence of the two issued files, with the
//! permission bits each one requires.

pub mod pemfile;
