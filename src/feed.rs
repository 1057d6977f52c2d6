//! Source feed loop: window assembly and queue advancement.

use std::sync::Arc;

use tinyvec::ArrayVec;

use super::device::Device;
use super::resample::Window;
use super::source::{Buffer, Source, SourceState, SourceType};
use super::{FRACTION_BITS, FRACTION_MASK, FRACTION_ONE, STACK_DATA_SIZE};

/// Stack-resident window of contiguous source bytes handed to the mixer.
type StackWindow = ArrayVec<[u8; STACK_DATA_SIZE]>;

/// Append `count` zero bytes to the window.
#[inline]
fn zero_fill(window: &mut StackWindow, count: usize) {
    window.resize(window.len() + count, 0);
}

/// Assemble the window for a static source: the single buffer, with the
/// loop region `[LoopStart, LoopEnd)` tiled as many times as the window
/// needs while looping. Clears the caller's loop flag when playback has
/// moved past the loop region (or the region is degenerate), after which
/// the remainder past the buffer end is zero.
fn fill_static(
    window: &mut StackWindow,
    mut remaining: usize,
    buffer: &Buffer,
    position: usize,
    looping: &mut bool,
    pre_pad: usize,
    frame_size: usize,
) {
    let data = &buffer.data;
    let loop_start = buffer.loop_start;
    let loop_end = buffer.loop_end.min(buffer.sample_count());

    if !*looping || position >= loop_end || loop_start >= loop_end {
        *looping = false;

        let pos;
        if position >= pre_pad {
            pos = (position - pre_pad) * frame_size;
        } else {
            let fill = ((pre_pad - position) * frame_size).min(remaining);
            zero_fill(window, fill);
            remaining -= fill;
            pos = 0;
        }

        // Copy what's left to play in the source buffer and clear the rest
        // of the window.
        let copy = data.len().saturating_sub(pos).min(remaining);
        window.extend_from_slice(&data[pos..pos + copy]);
        remaining -= copy;
        zero_fill(window, remaining);
    } else {
        let pos;
        if position >= loop_start {
            let mut p = position - loop_start;
            while p < pre_pad {
                p += loop_end - loop_start;
            }
            pos = (p - pre_pad + loop_start) * frame_size;
        } else if position >= pre_pad {
            pos = (position - pre_pad) * frame_size;
        } else {
            let fill = ((pre_pad - position) * frame_size).min(remaining);
            zero_fill(window, fill);
            remaining -= fill;
            pos = 0;
        }

        // Copy what's left of this loop iteration, then tile the loop
        // region into the rest of the window.
        let copy = (loop_end * frame_size).saturating_sub(pos).min(remaining);
        window.extend_from_slice(&data[pos..pos + copy]);
        remaining -= copy;

        let loop_bytes = (loop_end - loop_start) * frame_size;
        while remaining > 0 {
            let copy = loop_bytes.min(remaining);
            window.extend_from_slice(&data[loop_start * frame_size..loop_start * frame_size + copy]);
            remaining -= copy;
        }
    }
}

/// Assemble the window for a streaming source by crawling the buffer queue
/// from the entry at `start`. When the playback position sits closer to the
/// entry start than the pre-padding, earlier entries supply the missing
/// pre-roll (wrapping to the queue tail when looping, zero-filling
/// otherwise). Entries without a buffer are skipped; running off the queue
/// end zero-fills the remainder unless looping wraps back to the head.
fn fill_streaming(
    window: &mut StackWindow,
    mut remaining: usize,
    queue: &[Option<Arc<Buffer>>],
    start: usize,
    position: usize,
    looping: bool,
    pre_pad: usize,
    frame_size: usize,
) {
    let mut index = start;
    let mut pos;

    if position >= pre_pad {
        pos = (position - pre_pad) * frame_size;
    } else {
        let mut needed = (pre_pad - position) * frame_size;
        pos = 0;
        // A looping queue with no data anywhere cannot satisfy any
        // pre-roll; synthesize it instead of cycling forever.
        if looping && queue.iter().flatten().all(|buffer| buffer.data.is_empty()) {
            let fill = needed.min(remaining);
            zero_fill(window, fill);
            remaining -= fill;
            needed = 0;
        }
        while needed > 0 {
            if index == 0 && !looping {
                let fill = needed.min(remaining);
                zero_fill(window, fill);
                remaining -= fill;
                pos = 0;
                break;
            }

            index = if index == 0 { queue.len() - 1 } else { index - 1 };

            if let Some(buffer) = &queue[index] {
                if buffer.data.len() > needed {
                    pos = buffer.data.len() - needed;
                    break;
                }
                needed -= buffer.data.len();
            }
        }
    }

    let mut iter = Some(index);
    // Progress marker across loop wraps; a full lap without copying any
    // bytes means the queue holds no data at all.
    let mut lap_len = window.len();
    while let Some(index) = iter {
        if remaining == 0 {
            break;
        }
        if let Some(buffer) = &queue[index] {
            let size = buffer.data.len();
            // Skip the data already played.
            if size <= pos {
                pos -= size;
            } else {
                let copy = (size - pos).min(remaining);
                window.extend_from_slice(&buffer.data[pos..pos + copy]);
                remaining -= copy;
                pos = 0;
            }
        }
        if index + 1 < queue.len() {
            iter = Some(index + 1);
        } else if looping {
            if window.len() == lap_len {
                zero_fill(window, remaining);
                remaining = 0;
                iter = None;
            } else {
                lap_len = window.len();
                iter = Some(0);
            }
        } else {
            zero_fill(window, remaining);
            remaining = 0;
            iter = None;
        }
    }
}

/// Mix a playing source into the device for the next `samples_to_do` output
/// samples, or until the source runs out of data.
///
/// Each iteration assembles a contiguous window of source bytes padded for
/// the resampler, hands it to the mixer selected in the source parameters,
/// and advances the queue/loop state; the source transitions to `Stopped`
/// when the queue is exhausted without looping. On return the playback
/// cursor, queue cursor and HRTF ramp state reflect the samples produced.
pub fn mix_source(source: &mut Source, device: &mut Device, samples_to_do: usize) {
    if source.state != SourceState::Playing {
        return;
    }
    if source.queue.is_empty() {
        source.state = SourceState::Stopped;
        source.position = 0;
        source.position_fraction = 0;
        source.hrtf.counter = 0;
        source.hrtf.moving = false;
        return;
    }

    let mut state = source.state;
    let mut buffers_played = source.buffers_played;
    let mut position = source.position;
    let mut position_fraction = source.position_fraction;
    let mut looping = source.looping;
    let increment = source.params.step;
    let resampler = source.resampler;
    let frame_size = source.frame_size();
    let pre_pad = resampler.pre_padding();
    let post_pad = resampler.padding();

    let mut cursor = buffers_played.min(source.queue.len() - 1);
    let mut out_pos = 0;
    // A looping queue without a single playable frame can never advance.
    let queue_has_data = source
        .queue
        .iter()
        .flatten()
        .any(|buffer| buffer.sample_count() > 0);

    loop {
        let mut window = StackWindow::new();

        // Figure out how many source bytes this pass can use.
        let mut request = (samples_to_do - out_pos + 1) as u64;
        request *= increment as u64;
        request += (position_fraction + FRACTION_MASK) as u64;
        request >>= FRACTION_BITS;
        request += (post_pad + pre_pad) as u64;
        request *= frame_size as u64;

        let mut remaining = request.min(STACK_DATA_SIZE as u64) as usize;
        remaining -= remaining % frame_size;

        if source.source_type == SourceType::Static {
            match source.queue.first().and_then(|entry| entry.as_deref()) {
                Some(buffer) => fill_static(
                    &mut window,
                    remaining,
                    buffer,
                    position,
                    &mut looping,
                    pre_pad,
                    frame_size,
                ),
                None => zero_fill(&mut window, remaining),
            }
        } else {
            fill_streaming(
                &mut window,
                remaining,
                &source.queue,
                cursor,
                position,
                looping,
                pre_pad,
                frame_size,
            );
        }

        // Output samples the assembled window supports.
        let frames = (window.len() / frame_size) as i64;
        let avail = (frames - (pre_pad + post_pad) as i64) * FRACTION_ONE as i64
            - increment as i64
            - position_fraction as i64;
        let mut buffer_size = if avail > 0 {
            ((avail + increment as i64 - 1) / increment as i64) as usize
        } else {
            0
        };
        buffer_size = buffer_size.min(samples_to_do - out_pos);

        let win = Window::new(window.as_slice(), pre_pad * source.channels);
        let do_mix = source.params.do_mix;
        do_mix(
            source,
            device,
            win,
            &mut position,
            &mut position_fraction,
            out_pos,
            samples_to_do,
            buffer_size,
        );
        out_pos += buffer_size;

        // Advance the queue, fold looping positions back into the loop
        // region, and stop at the end of a non-looping queue.
        loop {
            let mut sample_count = 0;
            let mut loop_start = 0;
            let mut loop_end = 0;
            if let Some(buffer) = &source.queue[cursor] {
                sample_count = buffer.sample_count();
                loop_start = buffer.loop_start;
                loop_end = buffer.loop_end;
                if loop_end > position {
                    break;
                }
            }

            if looping && source.source_type == SourceType::Static && loop_end > loop_start {
                position = (position - loop_start) % (loop_end - loop_start) + loop_start;
                break;
            }

            if sample_count > position {
                break;
            }

            if cursor + 1 < source.queue.len() {
                cursor += 1;
                buffers_played += 1;
            } else if looping && queue_has_data {
                cursor = 0;
                buffers_played = 0;
            } else {
                state = SourceState::Stopped;
                cursor = 0;
                buffers_played = source.queue.len();
                position = 0;
                position_fraction = 0;
                break;
            }

            position -= sample_count;
        }

        if state != SourceState::Playing || out_pos >= samples_to_do {
            break;
        }
    }

    source.state = state;
    source.buffers_played = buffers_played;
    source.position = position;
    source.position_fraction = position_fraction;
    source.hrtf.offset = source.hrtf.offset.wrapping_add(out_pos as u32);
    if state == SourceState::Playing {
        source.hrtf.counter = source.hrtf.counter.max(out_pos) - out_pos;
        source.hrtf.moving = true;
    } else {
        source.hrtf.counter = 0;
        source.hrtf.moving = false;
    }
}
