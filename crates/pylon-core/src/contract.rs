//! Contract data model.
//!
//! A [`Contract`] is the in-memory form of an API description: a list
//! of operations, each tying an operation id to a `(method, path
//! template)` pair plus parameter declarations and an optional request
//! body schema. The model is declared in code through builders; parsing
//! an authoring format into it is out of scope here.

use http::Method;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A parsed API contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    name: String,
    version: String,
    operations: Vec<OperationDescriptor>,
}

impl Contract {
    /// Starts building a contract.
    #[must_use]
    pub fn builder(name: impl Into<String>, version: impl Into<String>) -> ContractBuilder {
        ContractBuilder {
            name: name.into(),
            version: version.into(),
            operations: Vec::new(),
        }
    }

    /// Returns the contract name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the contract version string.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the declared operations in authoring order.
    #[must_use]
    pub fn operations(&self) -> &[OperationDescriptor] {
        &self.operations
    }
}

/// Builder for [`Contract`].
#[derive(Debug)]
pub struct ContractBuilder {
    name: String,
    version: String,
    operations: Vec<OperationDescriptor>,
}

impl ContractBuilder {
    /// Adds an operation.
    #[must_use]
    pub fn operation(mut self, operation: OperationDescriptor) -> Self {
        self.operations.push(operation);
        self
    }

    /// Finishes the contract.
    ///
    /// Integrity rules (unique operation ids, unique routes, valid
    /// templates) are checked when the contract is indexed, not here.
    #[must_use]
    pub fn build(self) -> Contract {
        Contract {
            name: self.name,
            version: self.version,
            operations: self.operations,
        }
    }
}

/// One declared operation: a `(method, path template)` endpoint.
///
/// Descriptors are built once, owned by the operation index after
/// indexing, and referenced by downstream stages through `Arc` rather
/// than copied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationDescriptor {
    operation_id: String,
    #[serde(with = "http_method_serde")]
    method: Method,
    path_template: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    path_parameters: Vec<ParameterDeclaration>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    query_parameters: Vec<ParameterDeclaration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    request_body_schema: Option<ParamSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl OperationDescriptor {
    /// Starts building an operation. Defaults: `GET` on `/`.
    #[must_use]
    pub fn builder(operation_id: impl Into<String>) -> OperationBuilder {
        OperationBuilder {
            operation_id: operation_id.into(),
            method: Method::GET,
            path_template: "/".to_string(),
            path_parameters: Vec::new(),
            query_parameters: Vec::new(),
            request_body_schema: None,
            description: None,
        }
    }

    /// Returns the operation id.
    #[must_use]
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the path template as declared.
    #[must_use]
    pub fn path_template(&self) -> &str {
        &self.path_template
    }

    /// Returns the declared path parameters, in declaration order.
    #[must_use]
    pub fn path_parameters(&self) -> &[ParameterDeclaration] {
        &self.path_parameters
    }

    /// Returns the declared query parameters, in declaration order.
    #[must_use]
    pub fn query_parameters(&self) -> &[ParameterDeclaration] {
        &self.query_parameters
    }

    /// Returns the request body schema, if one is declared.
    #[must_use]
    pub const fn request_body_schema(&self) -> Option<&ParamSchema> {
        self.request_body_schema.as_ref()
    }

    /// Returns the human-readable description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Builder for [`OperationDescriptor`].
#[derive(Debug)]
pub struct OperationBuilder {
    operation_id: String,
    method: Method,
    path_template: String,
    path_parameters: Vec<ParameterDeclaration>,
    query_parameters: Vec<ParameterDeclaration>,
    request_body_schema: Option<ParamSchema>,
    description: Option<String>,
}

impl OperationBuilder {
    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the path template.
    #[must_use]
    pub fn path(mut self, template: impl Into<String>) -> Self {
        self.path_template = template.into();
        self
    }

    /// Declares a path parameter.
    #[must_use]
    pub fn path_param(mut self, declaration: ParameterDeclaration) -> Self {
        self.path_parameters.push(declaration);
        self
    }

    /// Declares a query parameter.
    #[must_use]
    pub fn query_param(mut self, declaration: ParameterDeclaration) -> Self {
        self.query_parameters.push(declaration);
        self
    }

    /// Declares the request body schema.
    #[must_use]
    pub fn request_body(mut self, schema: ParamSchema) -> Self {
        self.request_body_schema = Some(schema);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Finishes the operation.
    #[must_use]
    pub fn build(self) -> OperationDescriptor {
        OperationDescriptor {
            operation_id: self.operation_id,
            method: self.method,
            path_template: self.path_template,
            path_parameters: self.path_parameters,
            query_parameters: self.query_parameters,
            request_body_schema: self.request_body_schema,
            description: self.description,
        }
    }
}

/// Where a parameter is carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamLocation {
    /// Bound from a `{name}` template placeholder.
    Path,
    /// Parsed from the query string.
    Query,
}

/// How a parameter value is serialized on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamStyle {
    /// Plain value; arrays are comma-separated. The path style.
    Simple,
    /// `key=value` pairs; with `explode`, arrays repeat the key. The
    /// default query style.
    Form,
    /// `key[prop]=value` pairs building an object.
    DeepObject,
}

/// One declared parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterDeclaration {
    name: String,
    location: ParamLocation,
    style: ParamStyle,
    explode: bool,
    required: bool,
    schema: ParamSchema,
}

impl ParameterDeclaration {
    /// Declares a path parameter: simple style, always required.
    #[must_use]
    pub fn path(name: impl Into<String>, schema: ParamSchema) -> Self {
        Self {
            name: name.into(),
            location: ParamLocation::Path,
            style: ParamStyle::Simple,
            explode: false,
            required: true,
            schema,
        }
    }

    /// Declares a query parameter: form style, exploded, optional.
    #[must_use]
    pub fn query(name: impl Into<String>, schema: ParamSchema) -> Self {
        Self {
            name: name.into(),
            location: ParamLocation::Query,
            style: ParamStyle::Form,
            explode: true,
            required: false,
            schema,
        }
    }

    /// Marks the parameter required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Overrides the serialization style.
    #[must_use]
    pub const fn style(mut self, style: ParamStyle) -> Self {
        self.style = style;
        self
    }

    /// Overrides the explode flag.
    #[must_use]
    pub const fn explode(mut self, explode: bool) -> Self {
        self.explode = explode;
        self
    }

    /// Returns the declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns where the parameter is carried.
    #[must_use]
    pub const fn location(&self) -> ParamLocation {
        self.location
    }

    /// Returns the serialization style.
    #[must_use]
    pub const fn param_style(&self) -> ParamStyle {
        self.style
    }

    /// Returns the explode flag.
    #[must_use]
    pub const fn is_exploded(&self) -> bool {
        self.explode
    }

    /// Returns true if the parameter must be present.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the value schema.
    #[must_use]
    pub const fn schema(&self) -> &ParamSchema {
        &self.schema
    }
}

/// Value-shape descriptor handed to the validator capability.
///
/// Covers the shapes parameters and simple request bodies take. The
/// builder methods narrow the matching variant and leave others
/// untouched, so they chain freely:
///
/// ```rust
/// use pylon_core::contract::ParamSchema;
///
/// let schema = ParamSchema::string().min_length(1).one_of(["open", "closed"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParamSchema {
    /// UTF-8 string with optional length and enumeration constraints.
    String {
        /// Minimum length in characters.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_length: Option<usize>,
        /// Maximum length in characters.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
        /// Allowed values; empty means unconstrained.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        enum_values: Vec<String>,
    },
    /// Whole number with optional inclusive bounds.
    Integer {
        /// Lower bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<i64>,
        /// Upper bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<i64>,
    },
    /// Floating-point number with optional inclusive bounds.
    Number {
        /// Lower bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<f64>,
        /// Upper bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<f64>,
    },
    /// `true` or `false`.
    Boolean,
    /// Homogeneous array.
    Array {
        /// Schema every element must satisfy.
        items: Box<ParamSchema>,
        /// Minimum element count.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_items: Option<usize>,
        /// Maximum element count.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_items: Option<usize>,
    },
    /// Object with per-property schemas.
    Object {
        /// Property schemas by name.
        #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
        properties: IndexMap<String, ParamSchema>,
        /// Property names that must be present.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        required: Vec<String>,
    },
    /// Accepts any value.
    Any,
}

impl ParamSchema {
    /// An unconstrained string.
    #[must_use]
    pub const fn string() -> Self {
        Self::String {
            min_length: None,
            max_length: None,
            enum_values: Vec::new(),
        }
    }

    /// An unbounded integer.
    #[must_use]
    pub const fn integer() -> Self {
        Self::Integer {
            minimum: None,
            maximum: None,
        }
    }

    /// An unbounded number.
    #[must_use]
    pub const fn number() -> Self {
        Self::Number {
            minimum: None,
            maximum: None,
        }
    }

    /// A boolean.
    #[must_use]
    pub const fn boolean() -> Self {
        Self::Boolean
    }

    /// An array of `items`.
    #[must_use]
    pub fn array(items: Self) -> Self {
        Self::Array {
            items: Box::new(items),
            min_items: None,
            max_items: None,
        }
    }

    /// An object with no properties yet.
    #[must_use]
    pub fn object() -> Self {
        Self::Object {
            properties: IndexMap::new(),
            required: Vec::new(),
        }
    }

    /// A schema that accepts anything.
    #[must_use]
    pub const fn any() -> Self {
        Self::Any
    }

    /// Sets the minimum string length.
    #[must_use]
    pub fn min_length(mut self, length: usize) -> Self {
        if let Self::String { min_length, .. } = &mut self {
            *min_length = Some(length);
        }
        self
    }

    /// Sets the maximum string length.
    #[must_use]
    pub fn max_length(mut self, length: usize) -> Self {
        if let Self::String { max_length, .. } = &mut self {
            *max_length = Some(length);
        }
        self
    }

    /// Restricts a string to an allowed set of values.
    #[must_use]
    pub fn one_of<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Self::String { enum_values, .. } = &mut self {
            *enum_values = values.into_iter().map(Into::into).collect();
        }
        self
    }

    /// Sets the numeric lower bound.
    #[must_use]
    pub fn minimum(mut self, bound: i64) -> Self {
        match &mut self {
            Self::Integer { minimum, .. } => *minimum = Some(bound),
            Self::Number { minimum, .. } => *minimum = Some(bound as f64),
            _ => {}
        }
        self
    }

    /// Sets the numeric upper bound.
    #[must_use]
    pub fn maximum(mut self, bound: i64) -> Self {
        match &mut self {
            Self::Integer { maximum, .. } => *maximum = Some(bound),
            Self::Number { maximum, .. } => *maximum = Some(bound as f64),
            _ => {}
        }
        self
    }

    /// Sets the minimum array length.
    #[must_use]
    pub fn min_items(mut self, count: usize) -> Self {
        if let Self::Array { min_items, .. } = &mut self {
            *min_items = Some(count);
        }
        self
    }

    /// Sets the maximum array length.
    #[must_use]
    pub fn max_items(mut self, count: usize) -> Self {
        if let Self::Array { max_items, .. } = &mut self {
            *max_items = Some(count);
        }
        self
    }

    /// Adds an object property schema.
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, schema: Self) -> Self {
        if let Self::Object { properties, .. } = &mut self {
            properties.insert(name.into(), schema);
        }
        self
    }

    /// Marks an object property as required.
    #[must_use]
    pub fn require(mut self, name: impl Into<String>) -> Self {
        if let Self::Object { required, .. } = &mut self {
            required.push(name.into());
        }
        self
    }

    /// Returns the schema kind as it appears in error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::String { .. } => "string",
            Self::Integer { .. } => "integer",
            Self::Number { .. } => "number",
            Self::Boolean => "boolean",
            Self::Array { .. } => "array",
            Self::Object { .. } => "object",
            Self::Any => "any",
        }
    }
}

/// Serde shim for [`http::Method`], which has no serde impls of its own.
mod http_method_serde {
    use http::Method;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(method: &Method, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(method.as_str())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Method, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}
