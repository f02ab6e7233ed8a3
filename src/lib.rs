//! Core library for the aideon-merge command line application.
//!
//! The library merges a directory of spreadsheets with independently authored
//! column layouts into one table. Responsibilities are kept narrow: file
//! adapters live under [`aideon::merge::io`], the in-memory grid in
//! [`aideon::merge::model`], schema reconciliation in
//! [`aideon::merge::normalize`], row concatenation in
//! [`aideon::merge::concat`], and the batch pipeline with its event stream
//! under [`aideon::merge::batch`] and [`aideon::merge::events`].

pub mod aideon;

pub use aideon::merge::{
    LoadError, MergeError, NormalizeError, Result, batch, concat, error, events, io, model,
    normalize, options,
};
