//! Fair per-room count distribution: shuffled minimums first, then round-robin
//! top-ups until the budget or the per-room maximum is hit.

use crate::levelgen::RandomStream;

/// Splits `total` across `rooms`, honoring the inclusive per-room bounds.
/// Returns `(room index, count)` pairs in the shuffled visiting order; the
/// round-robin keeps any room within one of the even share.
pub(super) fn distribute_counts(
    total: usize,
    rooms: &[usize],
    per_room_min: usize,
    per_room_max: usize,
    rng: &mut RandomStream,
) -> Vec<(usize, usize)> {
    if rooms.is_empty() || per_room_max == 0 {
        return Vec::new();
    }

    let mut order: Vec<usize> = rooms.to_vec();
    rng.shuffle(&mut order);

    let mut remaining = total;
    let mut counts = vec![0_usize; order.len()];
    for count in &mut counts {
        let take = per_room_min.min(per_room_max).min(remaining);
        *count = take;
        remaining -= take;
    }

    while remaining > 0 {
        let mut gave_any = false;
        for count in &mut counts {
            if remaining == 0 {
                break;
            }
            if *count < per_room_max {
                *count += 1;
                remaining -= 1;
                gave_any = true;
            }
        }
        if !gave_any {
            break;
        }
    }

    order.into_iter().zip(counts).collect()
}
