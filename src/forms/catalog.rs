use super::{field, FieldMap, FormDefinition, Transport};

pub static COMPETITOR_PRODUCTS_BRIEF: FormDefinition = FormDefinition {
    slug: "competitor-products-brief",
    title: "Competitor Products Brief",
    webhook_path: "competitor-products-brief",
    transport: Transport::Query,
    required: &[
        field("companyName", "company_name"),
        field("productName", "product_name"),
        field("productCategory", "product_category"),
        field("features", "key_features"),
        field("target", "target_market"),
        field("email", "email_address"),
    ],
    optional: &[
        field("productSubcategory", "product_subcategory"),
        field("price", "price_point"),
        field("depth", "research_depth"),
        field("competitors", "known_competitors"),
        field("urls", "competitor_urls"),
        field("concerns", "competitive_concerns"),
    ],
    tracks_jobs: false,
    report_table: "competitor_product_brief_reports",
    markdown_field: Some("analysis_content"),
    label_fields: &["product_name", "company_name"],
};

pub static LEAD_NURTURE_EMAIL: FormDefinition = FormDefinition {
    slug: "lead-nurture-email",
    title: "Lead Nurture Email Sequence",
    webhook_path: "lead-nurture-email",
    transport: Transport::Query,
    required: &[
        field("companyName", "company_name"),
        field("productService", "product_service"),
        field("industry", "industry"),
        field("targetAudience", "target_audience"),
        field("sequenceGoal", "sequence_goal"),
        field("brandVoice", "brand_voice"),
        field("email", "email_address"),
    ],
    optional: &[
        field("uniqueValue", "unique_value"),
        field("contentThemes", "content_themes"),
        field("sequenceLength", "sequence_length"),
        field("brandVoiceExamples", "brand_voice_examples"),
        field("competitors", "competitors"),
        field("emailPerformance", "email_performance"),
        field("concerns", "concerns"),
    ],
    tracks_jobs: true,
    report_table: "lead_nurture_email_reports",
    markdown_field: None,
    label_fields: &["product_service", "company_name"],
};

pub static RE_ENGAGEMENT_EMAIL: FormDefinition = FormDefinition {
    slug: "re-engagement-email",
    title: "Re-engagement Email Sequence",
    webhook_path: "re-engagement-email",
    transport: Transport::Json,
    required: &[
        field("companyName", "company_name"),
        field("productService", "product_service"),
        field("industry", "industry"),
        field("email", "email_address"),
        field("inactivityPeriod", "inactivity_period"),
        field("listSize", "list_size"),
        field("primaryGoal", "primary_goal"),
        field("brandVoice", "brand_voice"),
    ],
    optional: &[
        field("incentive", "incentive"),
        field("originalValue", "original_value"),
        field("sequenceLength", "sequence_length"),
        field("previousAttempts", "previous_attempts"),
        field("inactivityReasons", "inactivity_reasons"),
        field("concerns", "concerns"),
    ],
    tracks_jobs: true,
    report_table: "re_engagement_email_reports",
    markdown_field: None,
    label_fields: &["product_service", "company_name"],
};

pub static ALL: [&FormDefinition; 3] = [
    &COMPETITOR_PRODUCTS_BRIEF,
    &LEAD_NURTURE_EMAIL,
    &RE_ENGAGEMENT_EMAIL,
];

/// Inbound and outbound name of the submission timestamp.
pub const TIMESTAMP: FieldMap = field("timestamp", "timestamp");

/// Outbound name of the minted job identifier.
pub const JOB_ID: &str = "job_id";
