use super::cursor::AttrCursor;

/// Maximum components per vertex attribute (scalar through vec4).
pub const MAX_COMPONENTS: usize = 4;

/// Describes one per-vertex attribute of a packed buffer.
///
/// The descriptor list passed to [`AttributeBuffer::new`] is fixed for the
/// buffer's lifetime: component counts and ordering must match on every
/// subsequent update.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AttributeDescriptor {
    pub name: &'static str,

    /// Components per vertex, in `1..=4`.
    pub component_count: usize,

    /// Default component values, padded to [`MAX_COMPONENTS`]; only the
    /// first `component_count` entries are meaningful.
    pub default_values: [f32; MAX_COMPONENTS],
}

impl AttributeDescriptor {
    #[inline]
    pub const fn scalar(name: &'static str, default: f32) -> Self {
        Self {
            name,
            component_count: 1,
            default_values: [default, 0.0, 0.0, 0.0],
        }
    }

    #[inline]
    pub const fn vec2(name: &'static str, defaults: [f32; 2]) -> Self {
        Self {
            name,
            component_count: 2,
            default_values: [defaults[0], defaults[1], 0.0, 0.0],
        }
    }

    #[inline]
    pub const fn vec3(name: &'static str, defaults: [f32; 3]) -> Self {
        Self {
            name,
            component_count: 3,
            default_values: [defaults[0], defaults[1], defaults[2], 0.0],
        }
    }

    #[inline]
    pub const fn vec4(name: &'static str, defaults: [f32; 4]) -> Self {
        Self {
            name,
            component_count: 4,
            default_values: defaults,
        }
    }

    /// The meaningful slice of `default_values`.
    #[inline]
    pub fn defaults(&self) -> &[f32] {
        &self.default_values[..self.component_count]
    }
}

/// Flat per-attribute vertex storage for one GPU buffer.
///
/// Holds one `Vec<f32>` per declared attribute, each sized
/// `component_count * vertex_capacity`. Every vertex slot is pre-filled with
/// the attribute's defaults at allocation, so trailing capacity beyond the
/// packed range renders as an inert value rather than stale data.
#[derive(Debug)]
pub struct AttributeBuffer {
    vertex_capacity: usize,
    descriptors: Vec<AttributeDescriptor>,
    arrays: Vec<Vec<f32>>,
}

impl AttributeBuffer {
    /// Allocates storage for `vertex_capacity` vertices across `descriptors`.
    pub fn new(vertex_capacity: usize, descriptors: &[AttributeDescriptor]) -> Self {
        let arrays = descriptors
            .iter()
            .map(|d| {
                debug_assert!(
                    d.component_count >= 1 && d.component_count <= MAX_COMPONENTS,
                    "attribute '{}' has invalid component count {}",
                    d.name,
                    d.component_count
                );
                let mut data = vec![0.0f32; vertex_capacity * d.component_count];
                fill_defaults(&mut data, d.defaults());
                data
            })
            .collect();

        Self {
            vertex_capacity,
            descriptors: descriptors.to_vec(),
            arrays,
        }
    }

    /// Total vertex slots per attribute.
    #[inline]
    pub fn vertex_capacity(&self) -> usize {
        self.vertex_capacity
    }

    #[inline]
    pub fn attribute_count(&self) -> usize {
        self.descriptors.len()
    }

    #[inline]
    pub fn descriptor(&self, index: usize) -> &AttributeDescriptor {
        &self.descriptors[index]
    }

    /// Flat component values of attribute `index` (length
    /// `component_count * vertex_capacity`). This is the slice a GPU consumer
    /// uploads.
    #[inline]
    pub fn values(&self, index: usize) -> &[f32] {
        &self.arrays[index]
    }

    /// Looks up an attribute's flat values by descriptor name.
    pub fn values_named(&self, name: &str) -> Option<&[f32]> {
        self.descriptors
            .iter()
            .position(|d| d.name == name)
            .map(|i| self.arrays[i].as_slice())
    }

    /// Builds one stack-local cursor per attribute.
    ///
    /// `N` must equal [`attribute_count`](Self::attribute_count); the caller
    /// ([`PackBatch`](super::PackBatch)) checks this before calling.
    pub(crate) fn cursors<const N: usize>(&mut self) -> [AttrCursor<'_>; N] {
        debug_assert_eq!(N, self.arrays.len());
        let mut iter = self.arrays.iter_mut();
        core::array::from_fn(|_| {
            AttrCursor::new(iter.next().expect("arity checked against descriptor list"))
        })
    }
}

/// Tiles `defaults` over the whole of `data`.
fn fill_defaults(data: &mut [f32], defaults: &[f32]) {
    let stride = defaults.len();
    for slot in data.chunks_exact_mut(stride) {
        slot.copy_from_slice(defaults);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── default fill ──────────────────────────────────────────────────────

    #[test]
    fn new_buffer_is_default_filled() {
        let buffer = AttributeBuffer::new(8, &[AttributeDescriptor::vec2("position", [0.0, 0.0])]);
        assert_eq!(buffer.values(0).len(), 16);
        assert!(buffer.values(0).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn non_zero_defaults_tile_every_slot() {
        let buffer =
            AttributeBuffer::new(3, &[AttributeDescriptor::vec3("color", [0.5, 0.25, 1.0])]);
        assert_eq!(
            buffer.values(0),
            &[0.5, 0.25, 1.0, 0.5, 0.25, 1.0, 0.5, 0.25, 1.0]
        );
    }

    #[test]
    fn scalar_attribute_sizing() {
        let buffer = AttributeBuffer::new(5, &[AttributeDescriptor::scalar("weight", 1.0)]);
        assert_eq!(buffer.values(0), &[1.0; 5]);
    }

    // ── lookup ────────────────────────────────────────────────────────────

    #[test]
    fn values_named_finds_attributes() {
        let buffer = AttributeBuffer::new(
            2,
            &[
                AttributeDescriptor::vec2("position", [0.0, 0.0]),
                AttributeDescriptor::vec4("color", [0.0, 0.0, 0.0, 0.0]),
            ],
        );
        assert_eq!(buffer.values_named("color").unwrap().len(), 8);
        assert!(buffer.values_named("normal").is_none());
    }
}
