// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Registry Module
 * Source registry and active-set selection
 * © 2026 Bountyy Oy
 */

pub mod source_registry;

pub use source_registry::{SourceRegistry, SourceSelection};
