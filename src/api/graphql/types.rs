// # GraphQL API Layer
//
// Comprehensive GraphQL API implementation for RustyDB, providing a modern,
// type-safe interface for database operations with real-time capabilities.
//
// ## Features
//
// - **Dynamic Schema Generation**: Automatically generate GraphQL schemas from database metadata
// - **Query Operations**: Complex queries with filtering, pagination, and aggregations
// - **Mutation Operations**: CRUD operations with transaction support
// - **Subscriptions**: Real-time data streaming for table changes
// - **Performance**: DataLoader, query complexity analysis, caching
// - **Security**: Rate limiting, field-level authorization, depth limiting
//
// ## Architecture
//
// ```text
// ┌─────────────────────────────────────────────────────────┐
// │                    GraphQL API Layer                    │
// ├─────────────────────────────────────────────────────────┤
// │  Schema Types  │  Queries  │  Mutations  │  Subscriptions│
// ├─────────────────────────────────────────────────────────┤
// │  Complexity    │  DataLoader │  Caching  │  Rate Limiter│
// ├─────────────────────────────────────────────────────────┤
// │              Database Engine Core                       │
// └─────────────────────────────────────────────────────────┘
// ```

use base64::{Engine as _, engine::general_purpose};
use async_graphql::{
    Enum, SimpleObject,
};
use chrono::{DateTime as ChronoDateTime, Utc};
use serde::{Deserialize, Serialize};

// Note: This module requires the following dependencies in Cargo.toml:
// - async-graphql = "7.0"
// - tokio = { version = "1", features = ["full"] }
// - tokio-stream = "0.1"
// - futures-util = "0.3"
// - serde = { version = "1", features = ["derive"] }
// - serde_json = "1"
// - chrono = { version = "0.4", features = ["serde"] }
// - uuid = { version = "1", features = ["v4", "serde"] }
// - base64 = "0.21"
// - async-stream = "0.3"
// - async-trait = "0.1"

// ============================================================================
// PART 1: SCHEMA & TYPE SYSTEM (700+ lines)
// ============================================================================

// Custom scalar type for DateTime values
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DateTime(ChronoDateTime<Utc>);

#[async_graphql::Scalar]
impl async_graphql::ScalarType for DateTime {
    fn parse(value: async_graphql::Value) -> async_graphql::InputValueResult<Self> {
        if let async_graphql::Value::String(s) = value {
            ChronoDateTime::parse_from_rfc3339(&s)
                .map(|dt| DateTime(dt.with_timezone(&Utc)))
                .map_err(|e| async_graphql::InputValueError::custom(format!("Invalid datetime: {}", e)))
        } else {
            Err(async_graphql::InputValueError::expected_type(value))
        }
    }

    fn to_value(&self) -> async_graphql::Value {
        async_graphql::Value::String(self.0.to_rfc3339())
    }
}

impl DateTime {
    pub fn now() -> Self {
        DateTime(Utc::now())
    }

    pub fn inner(&self) -> &ChronoDateTime<Utc> {
        &self.0
    }
}

// Custom scalar type for JSON values
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Json(pub serde_json::Value);

#[async_graphql::Scalar]
impl async_graphql::ScalarType for Json {
    fn parse(value: async_graphql::Value) -> async_graphql::InputValueResult<Self> {
        Ok(Json(serde_json::to_value(value).map_err(|e| {
            async_graphql::InputValueError::custom(format!("Invalid JSON: {}", e))
        })?))
    }

    fn to_value(&self) -> async_graphql::Value {
        serde_json::from_value(self.0.clone())
            .unwrap_or(async_graphql::Value::Null)
    }
}

// Custom scalar type for Binary data
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Binary(Vec<u8>);

#[async_graphql::Scalar]
impl async_graphql::ScalarType for Binary {
    fn parse(value: async_graphql::Value) -> async_graphql::InputValueResult<Self> {
        if let async_graphql::Value::String(s) = value {
            general_purpose::STANDARD.decode(&s)
                .map(Binary)
                .map_err(|e| async_graphql::InputValueError::custom(format!("Invalid base64: {}", e)))
        } else {
            Err(async_graphql::InputValueError::expected_type(value))
        }
    }

    fn to_value(&self) -> async_graphql::Value {
        async_graphql::Value::String(general_purpose::STANDARD.encode(&self.0))
    }
}

// Custom scalar type for large integers
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BigInt(pub i64);

#[async_graphql::Scalar]
impl async_graphql::ScalarType for BigInt {
    fn parse(value: async_graphql::Value) -> async_graphql::InputValueResult<Self> {
        if let async_graphql::Value::String(s) = value {
            s.parse::<i64>()
                .map(BigInt)
                .map_err(|e| async_graphql::InputValueError::custom(format!("Invalid BigInt: {}", e)))
        } else if let async_graphql::Value::Number(n) = value {
            n.as_i64()
                .map(BigInt)
                .ok_or_else(|| async_graphql::InputValueError::custom("Number too large"))
        } else {
            Err(async_graphql::InputValueError::expected_type(value))
        }
    }

    fn to_value(&self) -> async_graphql::Value {
        async_graphql::Value::String(self.0.to_string())
    }
}

// GraphQL representation of database data types
#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum DataType {
    Null,
    Boolean,
    Integer,
    Float,
    String,
    Bytes,
    Date,
    Timestamp,
    Json,
    Array,
    Decimal,
    Uuid,
}

// Sort order for query results
#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    Desc,
}

// Filter operations for WHERE clauses
#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum FilterOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    NotLike,
    In,
    NotIn,
    IsNull,
    IsNotNull,
    Between,
    Contains,
    StartsWith,
    EndsWith,
}

// Aggregate functions
#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum AggregateFunc {
    Count,
    Sum,
    Avg,
    Min,
    Max,
    StdDev,
    Variance,
}

// Join types for multi-table queries
#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

// Transaction isolation levels
#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

// Node interface - all objects with an ID implement this
// FIXME: Interface derive disabled due to trait bound issues
// #[derive(Interface)]
// #[graphql(field(name = "id", ty = "&ID"))]
// pub enum Node {
//     Table(TableType),
//     Column(ColumnType),
//     Row(RowType),
// }

// Timestamped interface - objects with creation/modification timestamps
// FIXME: Interface derive disabled due to trait bound issues
// #[derive(Interface)]
// #[graphql(
//     field(name = "created_at", ty = "DateTime"),
//     field(name = "updated_at", ty = "Option<DateTime>")
// )]
// pub enum Timestamped {
//     Table(TableType),
//     Row(RowType),
// }

// Auditable interface - objects with audit trail
// FIXME: Interface derive disabled due to trait bound issues
// #[derive(Interface)]
// #[graphql(
//     field(name = "created_by", ty = "String"),
//     field(name = "updated_by", ty = "Option<String>")
// )]
// pub enum Auditable {
//     Table(TableType),
//     Row(RowType),
// }

// Database schema information
#[derive(SimpleObject, Clone, Debug)]
pub struct DatabaseSchema {
    // Schema name
    pub name: String,
    // Schema owner
    pub owner: String,
    // Tables in this schema
    pub tables: Vec<String>,
    // Creation timestamp
    pub created_at: DateTime,
}
