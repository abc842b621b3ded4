/// Data layer: core types, loading, caching, filtering and aggregation.
///
/// Architecture:
/// ```text
///  remote .csv / local .csv .json .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  fetch + parse → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  cache    │  keep the Dataset for one TTL window
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply sidebar predicates → View
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  top-N, correlations, group means, counts, treemap
///   └───────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
