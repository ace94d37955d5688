//! Grammar kind names.
//!
//! The raw tree identifies nodes by these names; the CST interns them into
//! [`KindId`](super::KindId)s. Consumers match on names, so the constants
//! live here rather than in an enum.

/// Root node of every parse.
pub const DOCUMENT: &str = "document";

/// `include "path"`
pub const INCLUDE_DECLARATION: &str = "include_declaration";
/// `cpp_include "path"`
pub const CPP_INCLUDE_DECLARATION: &str = "cpp_include_declaration";
/// `namespace scope identifier`
pub const NAMESPACE_DECLARATION: &str = "namespace_declaration";
/// `typedef type Name`
pub const TYPEDEF_DECLARATION: &str = "typedef_declaration";
/// `const type Name = value`
pub const CONST_DECLARATION: &str = "const_declaration";
/// `struct Name { … }`
pub const STRUCT_DEFINITION: &str = "struct_definition";
/// `union Name { … }`
pub const UNION_DEFINITION: &str = "union_definition";
/// `exception Name { … }`
pub const EXCEPTION_DEFINITION: &str = "exception_definition";
/// `enum Name { … }`
pub const ENUM_DEFINITION: &str = "enum_definition";
/// `senum Name { … }`
pub const SENUM_DEFINITION: &str = "senum_definition";
/// `service Name { … }`
pub const SERVICE_DEFINITION: &str = "service_definition";

/// Braced field list of a struct/union/exception
pub const FIELD_BLOCK: &str = "field_block";
/// Braced function list of a service
pub const FUNCTION_BLOCK: &str = "function_block";
/// Braced value list of an enum
pub const ENUM_BLOCK: &str = "enum_block";

/// One struct/union/exception field or function parameter
pub const FIELD: &str = "field";
/// The integer id of a field
pub const FIELD_ID: &str = "field_id";
/// The name identifier of a field
pub const FIELD_NAME: &str = "field_name";
/// One service function
pub const FUNCTION_DEFINITION: &str = "function_definition";
/// Parenthesized parameter list of a function
pub const PARAMETERS: &str = "parameters";
/// `throws ( … )` clause of a function
pub const THROWS: &str = "throws";
/// One enum value
pub const ENUM_VALUE: &str = "enum_value";
/// One senum string value
pub const SENUM_VALUE: &str = "senum_value";
/// Bracketed const list value
pub const CONST_LIST: &str = "const_list";
/// Braced const map value
pub const CONST_MAP: &str = "const_map";
/// Parenthesized annotation list
pub const ANNOTATIONS: &str = "annotations";

/// Deprecated `xsd_optional` field modifier
pub const XSD_OPTIONAL: &str = "xsd_optional";
/// Deprecated `xsd_nillable` field modifier
pub const XSD_NILLABLE: &str = "xsd_nillable";
/// Deprecated `xsd_attrs` field modifier block
pub const XSD_ATTRS: &str = "xsd_attrs";

/// Error recovery node
pub const ERROR: &str = "ERROR";
/// Zero-width inserted node
pub const MISSING: &str = "MISSING";

/// Kinds that open a top-level declaration.
pub const TOP_LEVEL: &[&str] = &[
    INCLUDE_DECLARATION,
    CPP_INCLUDE_DECLARATION,
    NAMESPACE_DECLARATION,
    TYPEDEF_DECLARATION,
    CONST_DECLARATION,
    STRUCT_DEFINITION,
    UNION_DEFINITION,
    EXCEPTION_DEFINITION,
    ENUM_DEFINITION,
    SENUM_DEFINITION,
    SERVICE_DEFINITION,
];
