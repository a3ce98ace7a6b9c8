use std::path::Path;

use anyhow::{Context, Result};

/// Guess the SPDX identifier of a license file from its text.
///
/// Best-effort phrase matching over the opening portion of the file. Used
/// only to annotate reports; attribution itself is keyed on file paths, not
/// identifiers.
pub fn identify_file(path: &Path) -> Result<Option<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading license file {}", path.display()))?;
    Ok(identify(&content))
}

/// Guess the SPDX identifier of license text.
pub fn identify(content: &str) -> Option<String> {
    // Normalize whitespace so phrase matching survives line wrapping.
    let head: String = content
        .split_whitespace()
        .take(120)
        .collect::<Vec<_>>()
        .join(" ");

    let id = if head.contains("Apache License") && head.contains("Version 2.0") {
        "Apache-2.0"
    } else if head.contains("MIT License") || head.contains("Permission is hereby granted, free of charge") {
        "MIT"
    } else if head.contains("Redistribution and use in source and binary forms") {
        if content.contains("neither the name") || content.contains("Neither the name") {
            "BSD-3-Clause"
        } else {
            "BSD-2-Clause"
        }
    } else if head.contains("GNU LESSER GENERAL PUBLIC LICENSE") {
        if head.contains("Version 3") {
            "LGPL-3.0"
        } else {
            "LGPL-2.1"
        }
    } else if head.contains("GNU GENERAL PUBLIC LICENSE") {
        if head.contains("Version 3") {
            "GPL-3.0"
        } else {
            "GPL-2.0"
        }
    } else if head.contains("GNU AFFERO GENERAL PUBLIC LICENSE") {
        "AGPL-3.0"
    } else if head.contains("Mozilla Public License") && head.contains("2.0") {
        "MPL-2.0"
    } else if head.contains("Permission to use, copy, modify, and/or distribute this software") {
        "ISC"
    } else if head.contains("This is free and unencumbered software released into the public domain") {
        "Unlicense"
    } else if head.contains("Creative Commons Legal Code") && head.contains("CC0") {
        "CC0-1.0"
    } else {
        return None;
    };
    Some(id.to_string())
}
