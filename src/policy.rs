// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! User eligibility policy.

use crate::config::PolicySettings;

/// Check if user may run synchronization.
///
/// System and service accounts sit below the lowest allowed id. Prohibited
/// names are refused no matter what id they carry.
pub fn is_eligible(policy: &PolicySettings, uid: u32, name: &str) -> bool {
    if uid < policy.lowest_allowed_uid {
        return false;
    }

    !policy.prohibited_users.iter().any(|user| user == name)
}

/// Check if console owner means that nobody has logged in yet.
pub fn is_unknown_user(policy: &PolicySettings, name: &str) -> bool {
    name.trim().is_empty() || policy.unknown_user_names.iter().any(|user| user == name)
}
