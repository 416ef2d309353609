//! Downward search for the largest stable truncation of an AAA model

use tracing::{debug, warn};

use crate::aaa::AaaKernel;

/// State of the order search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// Order about to be examined
    Searching(usize),
    /// Order of the first truncation (from the top) without right-half-plane poles
    Stable(usize),
    /// Every order down to 1 had unstable poles
    Exhausted,
}

/// Result of [`search_stable_order`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    pub state: SearchState,
    /// Order the kernel selected on construction
    pub order_orig: usize,
    /// Order of the kernel's active truncation after the search
    pub order: usize,
    /// Number of orders examined
    pub iterations: usize,
}

/// Number of poles with positive real part
pub fn count_unstable(poles: &[num_complex::Complex64]) -> usize {
    poles.iter().filter(|p| p.re > 0.0).count()
}

/// Walk the kernel's orders downward until its poles are all stable
///
/// Leaves the kernel on the selected truncation. When no order in
/// `1..=order_orig` is stable the kernel is reset to `order_orig`.
pub fn search_stable_order<K: AaaKernel + ?Sized>(kernel: &mut K) -> SearchOutcome {
    let order_orig = kernel.order();
    let mut state = if order_orig == 0 {
        SearchState::Stable(0)
    } else {
        SearchState::Searching(order_orig)
    };
    let mut iterations = 0;

    while let SearchState::Searching(order) = state {
        kernel.choose(order);
        iterations += 1;

        let num_unstable = count_unstable(kernel.poles());
        let res_rms = kernel.res_rms();
        debug!(
            order,
            num_unstable,
            res_rms_sq = res_rms * res_rms,
            "AAA order search"
        );

        state = if num_unstable == 0 {
            SearchState::Stable(kernel.order())
        } else if order > 1 {
            SearchState::Searching(order - 1)
        } else {
            SearchState::Exhausted
        };
    }

    if state == SearchState::Exhausted {
        kernel.choose(order_orig);
        warn!(
            order = kernel.order(),
            "AAA always unstable, using the original order"
        );
    }

    SearchOutcome {
        state,
        order_orig,
        order: kernel.order(),
        iterations,
    }
}
