//! Element and face loops, parallel with the `parallel` feature.

use crate::element::Element;
use crate::error::Result;
use crate::face::Face;

pub(crate) fn for_each_element<F>(elements: &mut [Element], f: F)
where
    F: Fn(&mut Element) + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        elements.par_iter_mut().for_each(f);
    }
    #[cfg(not(feature = "parallel"))]
    {
        elements.iter_mut().for_each(f);
    }
}

/// Stops at the first error (in no particular order when parallel).
pub(crate) fn try_for_each_element<F>(elements: &mut [Element], f: F) -> Result<()>
where
    F: Fn(&mut Element) -> Result<()> + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        elements.par_iter_mut().try_for_each(f)
    }
    #[cfg(not(feature = "parallel"))]
    {
        elements.iter_mut().try_for_each(f)
    }
}

pub(crate) fn for_each_face<F>(faces: &mut [Face], f: F)
where
    F: Fn(&mut Face) + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        faces.par_iter_mut().for_each(f);
    }
    #[cfg(not(feature = "parallel"))]
    {
        faces.iter_mut().for_each(f);
    }
}

/// Minimum of a fallible per-element value.
pub(crate) fn min_over_elements<F>(elements: &mut [Element], f: F) -> Result<f64>
where
    F: Fn(&mut Element) -> Result<f64> + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        elements
            .par_iter_mut()
            .map(f)
            .try_reduce(|| f64::INFINITY, |a, b| Ok(a.min(b)))
    }
    #[cfg(not(feature = "parallel"))]
    {
        elements
            .iter_mut()
            .map(f)
            .try_fold(f64::INFINITY, |acc, v| v.map(|v| acc.min(v)))
    }
}

/// Field-wise sum of a per-element vector.
pub(crate) fn sum_over_elements<F>(elements: &[Element], n: usize, f: F) -> Vec<f64>
where
    F: Fn(&Element) -> Vec<f64> + Send + Sync,
{
    let add = |mut a: Vec<f64>, b: Vec<f64>| {
        for (x, y) in a.iter_mut().zip(b) {
            *x += y;
        }
        a
    };
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        elements.par_iter().map(f).reduce(|| vec![0.0; n], add)
    }
    #[cfg(not(feature = "parallel"))]
    {
        elements.iter().map(f).fold(vec![0.0; n], add)
    }
}
