//! Policy documents attached to the bucket, the cost policy and the cost role.

use serde_json::{json, Value};

/// AWS billing account that delivers cost and usage reports into the bucket.
pub const BILLING_ACCOUNT: &str = "386209384616";

pub const POLICY_VERSION: &str = "2012-10-17";

fn root_principal(account_id: &str) -> String {
    format!("arn:aws:iam::{account_id}:root")
}

pub fn bucket_arn(bucket_name: &str) -> String {
    format!("arn:aws:s3:::{bucket_name}")
}

/// ARN of a customer-managed policy, which is never stored and always rebuilt from its parts.
pub fn policy_arn(account_id: &str, policy_name: &str) -> String {
    format!("arn:aws:iam::{account_id}:policy/{policy_name}")
}

/// Bucket policy that lets the billing account inspect the bucket and write reports into it.
pub fn cur_bucket_policy(bucket_name: &str) -> Value {
    let principal = root_principal(BILLING_ACCOUNT);
    json!({
        "Version": POLICY_VERSION,
        "Statement": [
            {
                "Effect": "Allow",
                "Principal": { "AWS": principal },
                "Action": ["s3:GetBucketAcl", "s3:GetBucketPolicy"],
                "Resource": bucket_arn(bucket_name)
            },
            {
                "Effect": "Allow",
                "Principal": { "AWS": principal },
                "Action": "s3:PutObject",
                "Resource": format!("{}/*", bucket_arn(bucket_name))
            }
        ]
    })
}

/// Read-only cost visibility plus read access to the report bucket.
pub fn cost_mgmt_policy(bucket_name: &str) -> Value {
    let bucket = bucket_arn(bucket_name);
    json!({
        "Version": POLICY_VERSION,
        "Statement": [
            {
                "Sid": "ReportBucketRead",
                "Effect": "Allow",
                "Action": ["s3:Get*", "s3:List*"],
                "Resource": [bucket.clone(), format!("{bucket}/*")]
            },
            {
                "Sid": "CostVisibility",
                "Effect": "Allow",
                "Action": [
                    "iam:ListAccountAliases",
                    "s3:ListAllMyBuckets",
                    "cur:DescribeReportDefinitions",
                    "organizations:List*",
                    "organizations:Describe*"
                ],
                "Resource": "*"
            }
        ]
    })
}

/// Trust policy allowing `external_account` to assume the role.
pub fn trust_policy(external_account: &str) -> Value {
    json!({
        "Version": POLICY_VERSION,
        "Statement": [
            {
                "Effect": "Allow",
                "Principal": { "AWS": root_principal(external_account) },
                "Action": "sts:AssumeRole"
            }
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_policy_targets_bucket_and_objects() {
        let doc = cur_bucket_policy("costmgmtacct1234");
        let statements = doc["Statement"].as_array().unwrap();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0]["Resource"], "arn:aws:s3:::costmgmtacct1234");
        assert_eq!(statements[1]["Resource"], "arn:aws:s3:::costmgmtacct1234/*");
        assert_eq!(statements[1]["Action"], "s3:PutObject");
        for statement in statements {
            assert_eq!(statement["Principal"]["AWS"], "arn:aws:iam::386209384616:root");
        }
    }

    #[test]
    fn cost_policy_is_read_only() {
        let doc = cost_mgmt_policy("bucket");
        let actions: Vec<&str> = doc["Statement"]
            .as_array()
            .unwrap()
            .iter()
            .flat_map(|s| s["Action"].as_array().unwrap())
            .map(|a| a.as_str().unwrap())
            .collect();
        assert!(actions.contains(&"cur:DescribeReportDefinitions"));
        assert!(actions.iter().all(|a| a.contains(":Get")
            || a.contains(":List")
            || a.contains(":Describe")));
        assert_eq!(doc["Statement"][0]["Resource"][1], "arn:aws:s3:::bucket/*");
    }

    #[test]
    fn trust_policy_names_external_account() {
        let doc = trust_policy("123456789012");
        assert_eq!(doc["Statement"][0]["Principal"]["AWS"], "arn:aws:iam::123456789012:root");
        assert_eq!(doc["Statement"][0]["Action"], "sts:AssumeRole");
    }

    #[test]
    fn policy_arn_is_rebuilt_from_account_and_name() {
        assert_eq!(policy_arn("123456789012", "cost_mgmt"), "arn:aws:iam::123456789012:policy/cost_mgmt");
    }
}
