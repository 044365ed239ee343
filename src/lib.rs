// Copyright 2022 David Haig
// Licensed under the Apache License, Version 2.0 (the "License");
//

//! Training data pipeline for LPCNet style neural vocoders.
//!
//! Turns a raw 16 bit PCM stream and its parallel per-frame feature stream into fixed shape
//! training batches: mu-law companded signal and prediction, excitation history, masked
//! conditioning features, pitch periods and the companded LPC residual as the target.
//!
//! Start with [`dataset::lpcnet_dataset::LpcNetDataset`].

#[macro_use]
extern crate log;

pub mod codec;
pub mod common;
pub mod dataset;
pub mod lpc;
