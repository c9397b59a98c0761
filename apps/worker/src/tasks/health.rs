// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Health check task.

use crate::types::HealthResponse;

pub const SERVICE_NAME: &str = "digital_twin_management";

pub fn health_check() -> HealthResponse {
    HealthResponse {
        status: "healthy",
        timestamp: super::unix_timestamp(),
        service: SERVICE_NAME,
    }
}
