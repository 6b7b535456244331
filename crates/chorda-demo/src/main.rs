//! Headless chorda pipeline demo.
//!
//! Drives the full generate → pack sequence over simulated frames, with the
//! three cache kinds doing what they do in a real host:
//! - ring segments live in a 4-shard multi-buffer cache; edits repack only
//!   the shard that changed
//! - chords pulse through an animated cache while "playing"
//! - labels sit in a plain cache and never repack after the first frame
//!
//! Repacking is decided purely by snapshot identity (`Arc::ptr_eq`), the
//! same signal a GPU host uses to skip vertex-buffer uploads.

use std::sync::Arc;

use anyhow::Result;

use chorda_engine::cache::{
    AnimatedShapeBuilder, AnimatedShapeCache, MultiBufferShapeCache, ShapeBufferCache,
    ShapeBuilder, ShardAccess, ShardPopulator, ShardStore, StorageKey,
};
use chorda_engine::coords::{ArcSpan, Vec2};
use chorda_engine::logging::{init_logging, LoggingConfig};
use chorda_engine::pack::{AttrCursor, AttributeBuffer, AttributeDescriptor, PackBatch};
use chorda_engine::paint::Color;
use chorda_engine::scene::{Chord, Label, Ring};
use chorda_engine::time::FrameClock;

const TRACK_SEGMENTS: u64 = 24;
const RING_SHARDS: usize = 4;
const FRAMES: u64 = 180;

const OUTER_RADIUS: f32 = 220.0;
const INNER_RADIUS: f32 = 190.0;

const RING_STORAGE: StorageKey = StorageKey::new(1);

const PALETTE: [[u8; 3]; 6] = [
    [230, 105, 62],
    [92, 140, 250],
    [96, 190, 120],
    [240, 180, 60],
    [180, 110, 230],
    [70, 200, 210],
];

fn palette_color(index: u64) -> Color {
    let [r, g, b] = PALETTE[(index % PALETTE.len() as u64) as usize];
    Color::from_srgb_u8(r, g, b, 255)
}

// ── dataset ───────────────────────────────────────────────────────────────

/// Live source data the caches reconcile against each frame.
struct Dataset {
    rings: Vec<Ring>,
}

fn build_dataset() -> Dataset {
    let tau = core::f32::consts::TAU;
    let step = tau / TRACK_SEGMENTS as f32;
    let gap = step * 0.06;

    let rings = (0..TRACK_SEGMENTS)
        .map(|i| {
            let start = i as f32 * step;
            Ring::new(
                i,
                ArcSpan::new(start + gap, start + step - gap),
                INNER_RADIUS,
                OUTER_RADIUS,
                palette_color(i),
            )
        })
        .collect();

    Dataset { rings }
}

fn build_chords() -> Vec<Chord> {
    let tau = core::f32::consts::TAU;
    let step = tau / TRACK_SEGMENTS as f32;

    // Deterministic link set: every third segment connects across the circle.
    (0..TRACK_SEGMENTS)
        .step_by(3)
        .map(|i| {
            let j = (i + TRACK_SEGMENTS / 2 + i % 5) % TRACK_SEGMENTS;
            let source = ArcSpan::new(i as f32 * step, i as f32 * step + step * 0.4);
            let target = ArcSpan::new(j as f32 * step, j as f32 * step + step * 0.4);
            Chord::new(i, source, target, INNER_RADIUS, palette_color(i).with_opacity(0.6))
        })
        .collect()
}

fn build_labels() -> Vec<Label> {
    let tau = core::f32::consts::TAU;
    let step = tau / TRACK_SEGMENTS as f32;

    (0..TRACK_SEGMENTS)
        .map(|i| {
            Label::new(
                i,
                i as f32 * step + step * 0.5,
                OUTER_RADIUS + 24.0,
                Vec2::new(36.0, 14.0),
                Color::from_srgb_u8(235, 235, 235, 255),
            )
        })
        .collect()
}

// ── cache builders ────────────────────────────────────────────────────────

/// Mirrors the dataset's ring list into the shards, touching only entries
/// whose data actually differs so unrelated shards stay clean.
struct RingPopulator;

impl ShardPopulator<Ring, Dataset> for RingPopulator {
    fn populate(&mut self, shards: &mut ShardAccess<'_, Ring>, data: &mut Dataset) {
        for id in shards.ids() {
            if !data.rings.iter().any(|r| r.id == id) {
                shards.remove_shape(&id);
            }
        }
        for ring in &data.rings {
            if !shards.contains_id(&ring.id) {
                shards.add_shape(ring.clone());
            } else if shards.shape_by_id(&ring.id) != Some(ring) {
                shards.update_shape(ring.clone());
            }
        }
    }
}

/// Chord set whose opacity pulses while the cache is playing.
struct ChordPulse {
    base: Vec<Chord>,
    phase: f32,
}

impl ShapeBuilder<f32> for ChordPulse {
    type Shape = Chord;

    fn build(&mut self, _dt: &mut f32) -> Vec<Chord> {
        self.base.clone()
    }
}

impl AnimatedShapeBuilder<f32> for ChordPulse {
    fn animate(&mut self, dt: &mut f32, shapes: &mut Vec<Chord>) {
        self.phase += *dt;
        for (i, chord) in shapes.iter_mut().enumerate() {
            let wave = (self.phase * 2.0 + i as f32 * 0.7).sin();
            let opacity = 0.55 + 0.35 * wave;
            chord.color = self.base[i].color.with_opacity(opacity);
        }
    }
}

struct LabelBuilder {
    labels: Vec<Label>,
}

impl ShapeBuilder<()> for LabelBuilder {
    type Shape = Label;

    fn build(&mut self, _ctx: &mut ()) -> Vec<Label> {
        self.labels.clone()
    }
}

// ── packing helpers ───────────────────────────────────────────────────────

fn position_color_buffer(vertex_capacity: usize) -> AttributeBuffer {
    AttributeBuffer::new(
        vertex_capacity,
        &[
            AttributeDescriptor::vec2("position", [0.0, 0.0]),
            AttributeDescriptor::vec4("color", [0.0, 0.0, 0.0, 0.0]),
        ],
    )
}

fn pack_rings(batch: &mut PackBatch, rings: &[Ring], buffer: &mut AttributeBuffer) -> usize {
    batch.begin();
    batch.update_buffer(
        rings,
        buffer,
        Ring::STRIP_VERTICES,
        rings.len(),
        |_, ring, cursors: &mut [AttrCursor<'_>; 2]| {
            let [pos, col] = cursors;
            ring.write_strip(pos, col);
        },
    );
    batch.finish();
    batch.vertices_written()
}

// ── main loop ─────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let mut dataset = build_dataset();
    anyhow::ensure!(!dataset.rings.is_empty(), "dataset has no ring segments");

    let mut ring_store: ShardStore<Ring> = ShardStore::new();
    let mut ring_cache = MultiBufferShapeCache::new(RING_SHARDS, RingPopulator);

    let mut chord_cache = AnimatedShapeCache::new(ChordPulse {
        base: build_chords(),
        phase: 0.0,
    });

    let mut label_cache = ShapeBufferCache::new(LabelBuilder {
        labels: build_labels(),
    });

    // Fixed-capacity buffers, one per ring shard plus one each for chords
    // and labels. Capacities are sized with headroom over the dataset.
    let rings_per_shard = (TRACK_SEGMENTS as usize).div_ceil(RING_SHARDS) + 2;
    let mut shard_buffers: Vec<AttributeBuffer> = (0..RING_SHARDS)
        .map(|_| position_color_buffer(rings_per_shard * Ring::STRIP_VERTICES))
        .collect();
    let mut chord_buffer = position_color_buffer(16 * Chord::STRIP_VERTICES);
    let mut label_buffer = position_color_buffer(TRACK_SEGMENTS as usize * Label::STRIP_VERTICES);

    let mut batch = PackBatch::new();
    let mut clock = FrameClock::new();

    // Previous snapshots; identity comparison decides what gets repacked.
    let mut prev_shards: Vec<Option<Arc<Vec<Ring>>>> = vec![None; RING_SHARDS];
    let mut prev_chords: Option<Arc<Vec<Chord>>> = None;
    let mut prev_labels: Option<Arc<Vec<Label>>> = None;

    let mut total_uploads = 0usize;

    log::info!(
        "packing {} rings / {} chords / {} labels across {} shards for {} frames",
        dataset.rings.len(),
        chord_cache.builder().base.len(),
        label_cache.builder().labels.len(),
        RING_SHARDS,
        FRAMES
    );

    for frame in 0..FRAMES {
        let time = clock.tick();
        let mut dt = time.dt;

        // Scripted edits standing in for user interaction.
        if frame == 30 {
            log::info!("frame {frame:3}: chords start playing");
            chord_cache.start();
        }
        if frame == 60 {
            log::info!("frame {frame:3}: recoloring ring 5");
            dataset.rings[5].color = Color::from_srgb_u8(250, 60, 60, 255);
            ring_cache.bust();
        }
        if frame == 100 {
            log::info!("frame {frame:3}: dropping ring 11");
            dataset.rings.retain(|r| r.id != 11);
            ring_cache.bust();
        }
        if frame == 150 {
            log::info!("frame {frame:3}: chords stop");
            chord_cache.stop();
        }

        // generate → pack, in the frame's fixed order.
        ring_cache.generate(&mut ring_store, RING_STORAGE, &mut dataset);
        chord_cache.generate(&mut dt);
        label_cache.generate(&mut ());

        let mut uploads = 0usize;

        let shards = ring_cache.buffers(&ring_store, RING_STORAGE);
        for (i, shard) in shards.iter().enumerate() {
            let unchanged = prev_shards[i]
                .as_ref()
                .is_some_and(|prev| Arc::ptr_eq(prev, shard));
            if unchanged {
                continue;
            }
            pack_rings(&mut batch, shard, &mut shard_buffers[i]);
            prev_shards[i] = Some(Arc::clone(shard));
            uploads += 1;
        }

        let chords = chord_cache.shapes();
        let chords_unchanged = prev_chords
            .as_ref()
            .is_some_and(|prev| Arc::ptr_eq(prev, &chords));
        if !chords_unchanged {
            batch.begin();
            batch.update_buffer(
                &chords,
                &mut chord_buffer,
                Chord::STRIP_VERTICES,
                chords.len(),
                |_, chord, cursors: &mut [AttrCursor<'_>; 2]| {
                    let [pos, col] = cursors;
                    chord.write_strip(pos, col);
                },
            );
            batch.finish();
            prev_chords = Some(chords);
            uploads += 1;
        }

        let labels = label_cache.shapes();
        let labels_unchanged = prev_labels
            .as_ref()
            .is_some_and(|prev| Arc::ptr_eq(prev, &labels));
        if !labels_unchanged {
            batch.begin();
            batch.update_buffer(
                &labels,
                &mut label_buffer,
                Label::STRIP_VERTICES,
                labels.len(),
                |_, label, cursors: &mut [AttrCursor<'_>; 2]| {
                    let [pos, col] = cursors;
                    label.write_strip(pos, col);
                },
            );
            let label_batches = batch.finish();
            log::debug!("labels packed: {label_batches} batches");
            prev_labels = Some(labels);
            uploads += 1;
        }

        total_uploads += uploads;

        if frame % 30 == 0 {
            log::info!(
                "frame {frame:3}: {uploads} buffer upload(s), {} rings tracked",
                ring_store
                    .get(RING_STORAGE)
                    .map(|s| s.len())
                    .unwrap_or_default()
            );
        }
    }

    log::info!(
        "done: {FRAMES} frames, {total_uploads} buffer uploads \
         (a naive repack-everything host would have done {})",
        FRAMES as usize * (RING_SHARDS + 2)
    );

    Ok(())
}
