//! Special functions and distribution CDFs.
//!
//! Direct implementations of the classical numerics behind the p-values:
//! erf (Abramowitz & Stegun 7.1.26), ln-gamma (Lanczos), the regularized
//! incomplete beta and gamma functions (continued fractions / series), and
//! on top of them the normal, Student t, chi-square, F and studentized
//! range CDFs. Accuracy is in the 1e-7 range, far below the Monte Carlo
//! noise these p-values are compared against.

use std::f64::consts::{PI, SQRT_2};

const MAX_ITER: usize = 300;
const EPS: f64 = 3e-14;
const FPMIN: f64 = 1e-300;

/// Error function, |error| < 1.5e-7 (Abramowitz & Stegun 7.1.26).
pub fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + 0.327_591_1 * x);
    let poly = t
        * (0.254_829_592
            + t * (-0.284_496_736 + t * (1.421_413_741 + t * (-1.453_152_027 + t * 1.061_405_429))));
    sign * (1.0 - poly * (-x * x).exp())
}

/// Standard normal CDF.
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / SQRT_2))
}

/// Standard normal density.
pub fn normal_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Natural log of the gamma function (Lanczos, g = 7).
pub fn ln_gamma(x: f64) -> f64 {
    const COEF: [f64; 9] = [
        0.999_999_999_999_809_93,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_13,
        -176.615_029_162_140_59,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_571_6e-6,
        1.505_632_735_149_311_6e-7,
    ];
    if x < 0.5 {
        // Reflection formula.
        return (PI / (PI * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let mut acc = COEF[0];
    for (i, c) in COEF.iter().enumerate().skip(1) {
        acc += c / (x + i as f64);
    }
    let t = x + 7.5;
    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + acc.ln()
}

/// Regularized incomplete beta function I_x(a, b).
pub fn betai(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let ln_bt = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let bt = ln_bt.exp();
    if x < (a + 1.0) / (a + b + 2.0) {
        bt * betacf(a, b, x) / a
    } else {
        1.0 - bt * betacf(b, a, 1.0 - x) / b
    }
}

/// Continued fraction for the incomplete beta (modified Lentz).
fn betacf(a: f64, b: f64, x: f64) -> f64 {
    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < FPMIN {
        d = FPMIN;
    }
    d = 1.0 / d;
    let mut h = d;
    for m in 1..=MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;
        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        h *= d * c;
        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;
        if (del - 1.0).abs() < EPS {
            break;
        }
    }
    h
}

/// Regularized lower incomplete gamma function P(a, x).
pub fn gammap(a: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x < a + 1.0 {
        // Series representation.
        let mut ap = a;
        let mut sum = 1.0 / a;
        let mut del = sum;
        for _ in 0..MAX_ITER {
            ap += 1.0;
            del *= x / ap;
            sum += del;
            if del.abs() < sum.abs() * EPS {
                break;
            }
        }
        sum * (-x + a * x.ln() - ln_gamma(a)).exp()
    } else {
        // Continued fraction for Q(a, x), modified Lentz.
        let mut b = x + 1.0 - a;
        let mut c = 1.0 / FPMIN;
        let mut d = 1.0 / b;
        let mut h = d;
        for i in 1..=MAX_ITER {
            let an = -(i as f64) * (i as f64 - a);
            b += 2.0;
            d = an * d + b;
            if d.abs() < FPMIN {
                d = FPMIN;
            }
            c = b + an / c;
            if c.abs() < FPMIN {
                c = FPMIN;
            }
            d = 1.0 / d;
            let del = d * c;
            h *= del;
            if (del - 1.0).abs() < EPS {
                break;
            }
        }
        1.0 - (-x + a * x.ln() - ln_gamma(a)).exp() * h
    }
}

/// Chi-square CDF with `k` degrees of freedom.
pub fn chi2_cdf(x: f64, k: f64) -> f64 {
    gammap(k / 2.0, x / 2.0)
}

/// Student t CDF with `df` degrees of freedom.
pub fn t_cdf(t: f64, df: f64) -> f64 {
    let p = 0.5 * betai(df / 2.0, 0.5, df / (df + t * t));
    if t >= 0.0 {
        1.0 - p
    } else {
        p
    }
}

/// F distribution CDF with `d1`/`d2` degrees of freedom.
pub fn f_cdf(f: f64, d1: f64, d2: f64) -> f64 {
    if f <= 0.0 {
        return 0.0;
    }
    betai(d1 / 2.0, d2 / 2.0, d1 * f / (d1 * f + d2))
}

/// CDF of the range of `k` iid standard normals.
///
/// P(R <= x) = k INT phi(u) [Phi(u) - Phi(u - x)]^(k-1) du, integrating the
/// location of the maximum. Composite Simpson over u in [-8, 8].
fn normal_range_cdf(x: f64, k: usize) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    let f = |u: f64| normal_pdf(u) * (normal_cdf(u) - normal_cdf(u - x)).powi(k as i32 - 1);
    k as f64 * simpson(f, -8.0, 8.0, 400)
}

/// Studentized range CDF: P(Q <= q) for `k` groups and `df` error degrees
/// of freedom.
///
/// The outer integral runs over the distribution of the pooled standard
/// deviation scale U = S/sigma (a chi_df / sqrt(df) variable); the inner
/// factor is the known-variance range CDF at q*u.
pub fn ptukey(q: f64, k: usize, df: f64) -> f64 {
    if q <= 0.0 {
        return 0.0;
    }
    debug_assert!(k >= 2);
    if df > 2_000.0 {
        // Known-variance limit.
        return normal_range_cdf(q, k).clamp(0.0, 1.0);
    }

    // Density of U: ln c = (df/2) ln df - ln Gamma(df/2) - (df/2 - 1) ln 2.
    let ln_c = (df / 2.0) * df.ln() - ln_gamma(df / 2.0) - (df / 2.0 - 1.0) * 2.0_f64.ln();
    let density = |u: f64| (ln_c + (df - 1.0) * u.ln() - df * u * u / 2.0).exp();

    // The density is concentrated around 1 with spread ~ 1/sqrt(2 df).
    let hi = 1.0 + 9.0 / (2.0 * df).sqrt();
    let f = |u: f64| {
        if u <= 0.0 {
            0.0
        } else {
            density(u) * normal_range_cdf(q * u, k)
        }
    };
    simpson(f, 1e-10, hi, 256).clamp(0.0, 1.0)
}

/// Composite Simpson quadrature with `n` (even) intervals.
fn simpson(f: impl Fn(f64) -> f64, a: f64, b: f64, n: usize) -> f64 {
    debug_assert!(n % 2 == 0);
    let h = (b - a) / n as f64;
    let mut acc = f(a) + f(b);
    for i in 1..n {
        let x = a + i as f64 * h;
        acc += if i % 2 == 0 { 2.0 } else { 4.0 } * f(x);
    }
    acc * h / 3.0
}
