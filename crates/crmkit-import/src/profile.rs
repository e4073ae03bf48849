//! Import profiles
//!
//! A profile names one bulk endpoint together with the columns it requires
//! and the sample data used to render its template.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::parser::missing_columns;

/// Bulk import target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportProfile {
    pub name: &'static str,
    /// Path of the bulk endpoint on the internal API
    pub endpoint: &'static str,
    /// Key the rows are wrapped under in the request body
    pub payload_key: &'static str,
    pub required_headers: &'static [&'static str],
    pub sample_headers: &'static [&'static str],
    pub sample_rows: &'static [&'static [&'static str]],
    pub template_file_name: &'static str,
    /// Noun used in the success notice, e.g. "lead(s) queued for insertion"
    pub success_noun: &'static str,
}

const LEAD_HEADERS: &[&str] = &["full_name", "email", "phone_number", "lead_status"];
const LEAD_SAMPLE_HEADERS: &[&str] = &[
    "full_name",
    "email",
    "phone_number",
    "lead_status",
    "address",
    "notes",
];
const LEAD_SAMPLE_ROWS: &[&[&str]] = &[
    &["John Doe", "john.doe@example.com", "1234567890", "New", "", ""],
    &[
        "Jane Smith",
        "jane.smith@example.com",
        "0987654321",
        "Contacted",
        "123 Main St",
        "Some notes",
    ],
];

pub const CUSTOMERS: ImportProfile = ImportProfile {
    name: "customers",
    endpoint: "/api/customers/bulk",
    payload_key: "customers",
    required_headers: &["full_name", "email", "phone_number"],
    sample_headers: &[
        "full_name",
        "email",
        "phone_number",
        "gender",
        "date_of_birth",
        "anniversary_date",
        "address",
        "company_name",
        "product_name",
        "policy_number",
        "premium",
        "coverage_amount",
        "renewal_date",
        "status",
        "source",
        "referrer",
        "notes",
    ],
    sample_rows: &[
        &[
            "Arjun Mehta",
            "arjun.mehta@example.com",
            "9211111111",
            "M",
            "1985-06-15",
            "2020-01-20",
            "221B Baker Street, Apt 4",
            "Zenith Tech Solutions",
            "Life Shield Plus",
            "LSP-0007A",
            "15000",
            "5000000",
            "2024-12-20",
            "Active",
            "Facebook Ads",
            "",
            "Prime prospect - wants annual reminder",
        ],
        &[
            "Pooja Nair",
            "pooja.nair@example.com",
            "9222222222",
            "F",
            "1990-11-01",
            "",
            "Artisan Avenue Lofts #302",
            "Nair Designs Co.",
            "Health Plus Plan",
            "HP-4521B",
            "8500",
            "2000000",
            "2025-03-15",
            "Active",
            "Referral",
            "Joseph Mathew",
            "Follow up for policy details",
        ],
        &[
            "Rohan Kapoor",
            "rohan.kapoor@example.com",
            "9199999999",
            "M",
            "",
            "",
            "Plot 44, Gu Sector",
            "Global Logistics",
            "Motor Secure",
            "MS-8899",
            "12000",
            "1000000",
            "2024-10-05",
            "Active",
            "LinkedIn Outreach",
            "",
            "Wants add-on coverage next renewal",
        ],
    ],
    template_file_name: "sample_customers_import_format.csv",
    success_noun: "customer record(s) queued",
};

pub const LEADS: ImportProfile = ImportProfile {
    name: "leads",
    endpoint: "/api/leads/bulk",
    payload_key: "leads",
    required_headers: LEAD_HEADERS,
    sample_headers: LEAD_SAMPLE_HEADERS,
    sample_rows: LEAD_SAMPLE_ROWS,
    template_file_name: "sample_leads_import.csv",
    success_noun: "lead(s) queued for insertion",
};

/// Leads submitted by a regular user rather than an admin.
pub const USER_LEADS: ImportProfile = ImportProfile {
    name: "user-leads",
    endpoint: "/api/leads/bulk-user",
    payload_key: "leads",
    required_headers: LEAD_HEADERS,
    sample_headers: LEAD_SAMPLE_HEADERS,
    sample_rows: LEAD_SAMPLE_ROWS,
    template_file_name: "sample_leads_import.csv",
    success_noun: "lead(s) queued for insertion",
};

impl ImportProfile {
    pub fn all() -> &'static [ImportProfile] {
        &[CUSTOMERS, LEADS, USER_LEADS]
    }

    /// Required columns absent from `headers`, in required order.
    pub fn missing_headers<S: AsRef<str>>(&self, headers: &[S]) -> Vec<String> {
        missing_columns(self.required_headers, headers)
    }
}

impl FromStr for ImportProfile {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        Self::all()
            .iter()
            .find(|p| p.name == wanted)
            .copied()
            .ok_or_else(|| {
                let names: Vec<_> = Self::all().iter().map(|p| p.name).collect();
                anyhow::anyhow!(
                    "Unknown import profile: {} (expected one of {})",
                    s,
                    names.join(", ")
                )
            })
    }
}

impl Display for ImportProfile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name)
    }
}
