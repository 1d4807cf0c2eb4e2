//! Shared helpers for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Option carried by the public RPCs in the acme fixture
pub const EXPOSE_OPTION: &str = "acme.options.expose";

pub const BILLING: &str = "acme/billing/v1/billing.proto";
pub const MONEY: &str = "acme/common/money.proto";
pub const ANNOTATIONS: &str = "acme/options/annotations.proto";
pub const AUDIT: &str = "acme/internal/audit.proto";

pub fn fixture_dir(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Copies a fixture tree into a scratch directory so tests can modify it
pub fn copy_fixture(name: &str) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    copy_tree(&fixture_dir(name), dir.path());
    dir
}

fn copy_tree(from: &Path, to: &Path) {
    for entry in fs::read_dir(from).expect("Failed to read fixture dir") {
        let entry = entry.expect("Failed to read fixture entry");
        let target = to.join(entry.file_name());
        if entry.path().is_dir() {
            fs::create_dir_all(&target).expect("Failed to create dir");
            copy_tree(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), &target).expect("Failed to copy fixture file");
        }
    }
}

pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("No parent")).expect("Failed to create dir");
    fs::write(path, content).expect("Failed to write file");
}

pub fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative))
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", relative, e))
}

/// Expected output for the billing file when only exposed RPCs are kept
pub const PRUNED_BILLING: &str = r#"syntax = "proto3";

package acme.billing.v1;

import "acme/options/annotations.proto";
import "acme/common/money.proto";
import "google/protobuf/timestamp.proto";

option go_package = "example.com/acme/billing/v1;billingv1";

service Billing {
  option deprecated = false;
  rpc Charge(ChargeRequest) returns (ChargeResponse) {
    option (acme.options.expose) = {
      level: LEVEL_PUBLIC
    };
  }
}

message ChargeRequest {
  string account_id = 1;
  acme.common.Money amount = 2;
  google.protobuf.Timestamp requested_at = 3;
}

message ChargeResponse {
  Status status = 1;
  enum Status {
    STATUS_UNSPECIFIED = 0;
    STATUS_OK = 1;
  }
}
"#;

pub const PRUNED_MONEY: &str = r#"syntax = "proto3";

package acme.common;

message Money {
  string currency_code = 1;
  int64 units = 2;
  int32 nanos = 3;
}
"#;
