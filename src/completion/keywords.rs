//! Static keyword grammars

use super::keyword_trie::{branch, leaf, KeywordEntry};

const SORT_ORDER: &[KeywordEntry] = &[leaf("ASC"), leaf("DESC")];

const JOIN: &[KeywordEntry] = &[leaf("JOIN")];

const SET_OPERATION: &[KeywordEntry] = &[leaf("ALL"), leaf("DISTINCT")];

const SELECT_MODIFIERS: &[KeywordEntry] = &[
    leaf("ALL"),
    leaf("DISTINCT"),
    leaf("AS"),
    branch("STRUCT", &[leaf("AS")]),
    leaf("VALUE"),
];

const BQ_CREATE_OBJECTS: &[KeywordEntry] = &[
    leaf("TABLE"),
    leaf("VIEW"),
    branch("MATERIALIZED", &[leaf("VIEW")]),
    leaf("FUNCTION"),
    leaf("PROCEDURE"),
    leaf("SCHEMA"),
    branch("TEMP", &[leaf("TABLE"), leaf("FUNCTION")]),
    branch("OR", &[branch("REPLACE", BQ_REPLACEABLE)]),
];

const BQ_REPLACEABLE: &[KeywordEntry] = &[
    leaf("TABLE"),
    leaf("VIEW"),
    leaf("FUNCTION"),
    leaf("PROCEDURE"),
];

const BQ_DROP_OBJECTS: &[KeywordEntry] = &[
    leaf("TABLE"),
    leaf("VIEW"),
    leaf("FUNCTION"),
    leaf("PROCEDURE"),
    leaf("SCHEMA"),
];

/// BigQuery standard SQL
pub const BIGQUERY: &[KeywordEntry] = &[
    branch("SELECT", SELECT_MODIFIERS),
    leaf("FROM"),
    leaf("WHERE"),
    branch("GROUP", &[leaf("BY")]),
    leaf("HAVING"),
    leaf("QUALIFY"),
    branch("ORDER", &[branch("BY", SORT_ORDER)]),
    leaf("LIMIT"),
    leaf("OFFSET"),
    leaf("WITH"),
    leaf("WINDOW"),
    branch("UNION", SET_OPERATION),
    branch("INTERSECT", &[leaf("DISTINCT")]),
    branch("EXCEPT", &[leaf("DISTINCT")]),
    leaf("JOIN"),
    branch("INNER", JOIN),
    branch("LEFT", &[leaf("JOIN"), branch("OUTER", JOIN)]),
    branch("RIGHT", &[leaf("JOIN"), branch("OUTER", JOIN)]),
    branch("FULL", &[leaf("JOIN"), branch("OUTER", JOIN)]),
    branch("CROSS", JOIN),
    leaf("ON"),
    leaf("USING"),
    leaf("UNNEST"),
    leaf("PIVOT"),
    leaf("UNPIVOT"),
    branch("INSERT", &[leaf("INTO")]),
    leaf("UPDATE"),
    branch("DELETE", &[leaf("FROM")]),
    branch("MERGE", &[leaf("INTO")]),
    branch("TRUNCATE", &[leaf("TABLE")]),
    branch("CREATE", BQ_CREATE_OBJECTS),
    branch("DROP", BQ_DROP_OBJECTS),
    branch("ALTER", &[leaf("TABLE"), leaf("VIEW"), leaf("SCHEMA")]),
    leaf("DECLARE"),
    leaf("SET"),
    leaf("BEGIN"),
    leaf("CALL"),
    leaf("CASE"),
    leaf("CAST"),
    leaf("SAFE_CAST"),
];

const ANSI_CREATE_OBJECTS: &[KeywordEntry] =
    &[leaf("TABLE"), leaf("VIEW"), leaf("INDEX"), leaf("SCHEMA")];

/// ANSI SQL subset
pub const ANSI: &[KeywordEntry] = &[
    branch("SELECT", &[leaf("ALL"), leaf("DISTINCT")]),
    leaf("FROM"),
    leaf("WHERE"),
    branch("GROUP", &[leaf("BY")]),
    leaf("HAVING"),
    branch("ORDER", &[branch("BY", SORT_ORDER)]),
    branch("UNION", SET_OPERATION),
    leaf("INTERSECT"),
    leaf("EXCEPT"),
    leaf("JOIN"),
    branch("INNER", JOIN),
    branch("LEFT", &[leaf("JOIN"), branch("OUTER", JOIN)]),
    branch("RIGHT", &[leaf("JOIN"), branch("OUTER", JOIN)]),
    branch("FULL", &[leaf("JOIN"), branch("OUTER", JOIN)]),
    branch("CROSS", JOIN),
    leaf("ON"),
    branch("INSERT", &[leaf("INTO")]),
    leaf("UPDATE"),
    branch("DELETE", &[leaf("FROM")]),
    branch("CREATE", ANSI_CREATE_OBJECTS),
    branch("DROP", ANSI_CREATE_OBJECTS),
    leaf("CASE"),
    leaf("CAST"),
];

/// Descriptions shown next to keywords
pub const META: &[(&str, &str)] = &[
    ("SELECT", "Query rows"),
    ("FROM", "Source table"),
    ("WHERE", "Filter rows"),
    ("GROUP", "Aggregate rows"),
    ("HAVING", "Filter groups"),
    ("QUALIFY", "Filter window results"),
    ("ORDER", "Sort rows"),
    ("LIMIT", "Cap row count"),
    ("OFFSET", "Skip rows"),
    ("WITH", "Common table expression"),
    ("WINDOW", "Named window"),
    ("UNION", "Combine results"),
    ("INTERSECT", "Rows in both results"),
    ("EXCEPT", "Rows only in the first result"),
    ("JOIN", "Join tables"),
    ("UNNEST", "Flatten an array"),
    ("PIVOT", "Rows to columns"),
    ("UNPIVOT", "Columns to rows"),
    ("INSERT", "Add rows"),
    ("UPDATE", "Change rows"),
    ("DELETE", "Remove rows"),
    ("MERGE", "Upsert rows"),
    ("TRUNCATE", "Remove all rows"),
    ("CREATE", "Create an object"),
    ("DROP", "Remove an object"),
    ("ALTER", "Change an object"),
    ("DECLARE", "Script variable"),
    ("SET", "Assign a variable"),
    ("CALL", "Run a procedure"),
    ("CAST", "Convert a type"),
    ("SAFE_CAST", "Convert a type, NULL on failure"),
    ("ASC", "Ascending"),
    ("DESC", "Descending"),
];
