//! Fixed segments that do not depend on the crawled URLs.

pub const PARAMETER_USAGE: &str = "\
[segment:sl_parameter_Usage]
@Parameters
query *=*

@Clean
path /*
# ----End of sl_parameter_Usage----
";

pub const PARAMETER_COUNT: &str = "\
[segment:sl_no_Of_Parameters]
@Home
path /

@5_Parameters
query rx:=(.)+=(.)+=(.)+(.)+(.)+

@4_Parameters
query rx:=(.)+=(.)+=(.)+(.)+

@3_Parameters
query rx:=(.)+=(.)+=(.)+

@2_Parameters
query rx:=(.)+=(.)+

@1_Parameter
query rx:=(.)+

@~Other
path /*
# ----End of sl_no_Of_Parameters----
";

pub const FOLDER_COUNT: &str = "\
[segment:sl_no_Of_Folders]
@Home
path /

@Folders/5
path rx:^/[^/]+/[^/]+/[^/]+/[^/]+/[^/]+

@Folders/4
path rx:^/[^/]+/[^/]+/[^/]+/[^/]+

@Folders/3
path rx:^/[^/]+/[^/]+/[^/]+

@Folders/2
path rx:^/[^/]+/[^/]+

@Folders/1
path rx:^/[^/]+

@~Other
path /*
# ----End of sl_no_Of_Folders----
";

/// Salesforce Commerce Cloud (Demandware) controller URLs.
pub const SFCC: &str = "\
[segment:sl_sfcc_urls]
@Home
path /

@SFCC_URLs
path */demandware*

@~Other
path /*

# ----End of sl_sfcc_URLs----
";

pub const SHOPIFY: &str = "\
[segment:sl_shopify]
@Home
path /

@PDP/Products/Variants
path */products/*
URL *variant=*

@PDP/Products
path */products/*

@PLP/Collections
path */collections/*

@Pages
path */pages/*

@~Other
path /*
# ----End of s_shopify_URLs----
";

/// Static segments always appended after the data-driven ones, in file order.
pub const ALWAYS: [(&str, &str); 3] = [
    ("Parameter usage", PARAMETER_USAGE),
    ("Number of parameters", PARAMETER_COUNT),
    ("Number of folders", FOLDER_COUNT),
];
