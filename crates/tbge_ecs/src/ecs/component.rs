//! # Component System
//!
//! Components are plain data attached to entities. The ECS never looks inside
//! them; any `'static + Send + Sync` type qualifies, so application types need
//! no registration boilerplate beyond
//! [`register_component_type`](crate::Coordinator::register_component_type).

/// Marker trait for ECS components.
///
/// Implemented for every `'static + Send + Sync` type. Type ids are assigned
/// at registration time, in registration order, rather than declared by the
/// type itself.
///
/// # Example
///
/// ```rust
/// use tbge_ecs::Coordinator;
///
/// #[derive(Debug, PartialEq)]
/// struct Position {
///     x: f32,
///     y: f32,
/// }
///
/// let mut ecs = Coordinator::new();
/// assert_eq!(ecs.register_component_type::<Position>(), 0);
/// ```
pub trait Component: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Component for T {}
