//! Probability distribution library.
//!
//! Surface mirrors a TI-style calculator: `pdf` takes a point, `cdf`
//! of the continuous families takes (low, high) and returns the
//! difference, `inv*` are quantile functions. Discrete families use
//! closed forms or log-space binomial coefficients.

use crate::special::{beta_inc, erfc, gamma_p, invert_cdf, ln_gamma, norm_quantile};
use crate::util;
use calc_engine::{CalcResult, EngineError, EvalContext, Value};

const AREA_MSG: &str = "|Area| must be <= 1";
const PROB_MSG: &str = "0 < probSuccess < 1 must be true";

fn check_area(area: f64) -> CalcResult<()> {
    if area.abs() > 1.0 {
        return Err(EngineError::InvalidArgument(AREA_MSG.to_string()));
    }
    Ok(())
}

fn check_prob(p: f64) -> CalcResult<()> {
    if p <= 0.0 || p > 1.0 {
        return Err(EngineError::InvalidArgument(PROB_MSG.to_string()));
    }
    Ok(())
}

fn wrap(ctx: &EvalContext, x: f64) -> Value {
    Value::Number(ctx.mode.from_f64(x))
}

// ---- continuous families, pure forms -------------------------------------

pub fn normal_pdf(x: f64, u: f64, sigma: f64) -> f64 {
    let z = (x - u) / sigma;
    (-0.5 * z * z).exp() / (sigma * (2.0 * std::f64::consts::PI).sqrt())
}

pub fn normal_cdf_below(x: f64, u: f64, sigma: f64) -> f64 {
    0.5 * erfc(-(x - u) / (sigma * std::f64::consts::SQRT_2))
}

pub fn t_pdf(x: f64, df: f64) -> f64 {
    let half = (df + 1.0) / 2.0;
    (ln_gamma(half) - ln_gamma(df / 2.0)).exp() / (df * std::f64::consts::PI).sqrt()
        * (1.0 + x * x / df).powf(-half)
}

pub fn t_cdf_below(x: f64, df: f64) -> f64 {
    let w = beta_inc(df / 2.0, 0.5, df / (df + x * x)) / 2.0;
    if x >= 0.0 {
        1.0 - w
    } else {
        w
    }
}

pub fn gamma_pdf(x: f64, shape: f64, scale: f64) -> f64 {
    if x < 0.0 {
        return 0.0;
    }
    ((shape - 1.0) * x.ln() - x / scale - ln_gamma(shape) - shape * scale.ln()).exp()
}

pub fn gamma_cdf_below(x: f64, shape: f64, scale: f64) -> f64 {
    gamma_p(shape, x / scale)
}

fn gamma_quantile(p: f64, shape: f64, scale: f64) -> f64 {
    let mut hi = (shape * scale).max(scale) + 1.0;
    while gamma_cdf_below(hi, shape, scale) < p && hi < 1e300 {
        hi *= 2.0;
    }
    invert_cdf(|x| gamma_cdf_below(x, shape, scale), 0.0, hi, p)
}

pub fn chi2_pdf(x: f64, df: f64) -> f64 {
    gamma_pdf(x, df / 2.0, 2.0)
}

pub fn chi2_cdf_below(x: f64, df: f64) -> f64 {
    gamma_cdf_below(x, df / 2.0, 2.0)
}

pub fn f_pdf(x: f64, d1: f64, d2: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    let ln_beta = ln_gamma(d1 / 2.0) + ln_gamma(d2 / 2.0) - ln_gamma((d1 + d2) / 2.0);
    ((d1 / 2.0) * (d1 / d2).ln() + (d1 / 2.0 - 1.0) * x.ln()
        - ((d1 + d2) / 2.0) * (1.0 + d1 * x / d2).ln()
        - ln_beta)
        .exp()
}

pub fn f_cdf_below(x: f64, d1: f64, d2: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    beta_inc(d1 / 2.0, d2 / 2.0, d1 * x / (d1 * x + d2))
}

pub fn beta_pdf(x: f64, a: f64, b: f64) -> f64 {
    if !(0.0..=1.0).contains(&x) {
        return 0.0;
    }
    (ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + (a - 1.0) * x.ln() + (b - 1.0) * (1.0 - x).ln())
        .exp()
}

// ---- discrete helpers ----------------------------------------------------

fn ln_choose(n: f64, k: f64) -> f64 {
    ln_gamma(n + 1.0) - ln_gamma(k + 1.0) - ln_gamma(n - k + 1.0)
}

pub fn binomial_pdf(k: f64, n: f64, p: f64) -> f64 {
    if k < 0.0 || k > n {
        return 0.0;
    }
    (ln_choose(n, k) + k * p.ln() + (n - k) * (1.0 - p).ln()).exp()
}

pub fn binomial_cdf(k: f64, n: f64, p: f64) -> f64 {
    if k < 0.0 {
        return 0.0;
    }
    if k >= n {
        return 1.0;
    }
    let k = k.floor();
    // P(X <= k) = I_{1-p}(n - k, k + 1)
    beta_inc(n - k, k + 1.0, 1.0 - p)
}

pub fn poisson_pdf(k: f64, lambda: f64) -> f64 {
    if k < 0.0 {
        return 0.0;
    }
    (k * lambda.ln() - lambda - ln_gamma(k + 1.0)).exp()
}

pub fn poisson_cdf(k: f64, lambda: f64) -> f64 {
    if k < 0.0 {
        return 0.0;
    }
    1.0 - gamma_p(k.floor() + 1.0, lambda)
}

pub fn hypergeometric_pdf(k: f64, draws: f64, success_pop: f64, total_pop: f64) -> f64 {
    if k < 0.0 || k > draws || k > success_pop || draws - k > total_pop - success_pop {
        return 0.0;
    }
    (ln_choose(success_pop, k) + ln_choose(total_pop - success_pop, draws - k)
        - ln_choose(total_pop, draws))
    .exp()
}

pub fn hypergeometric_cdf(k: f64, draws: f64, success_pop: f64, total_pop: f64) -> f64 {
    let mut acc = 0.0;
    let mut i = 0.0;
    while i <= k.floor() && i <= draws {
        acc += hypergeometric_pdf(i, draws, success_pop, total_pop);
        i += 1.0;
    }
    acc.min(1.0)
}

/// Smallest k with cdf(k) >= area, scanning the support.
fn discrete_quantile(area: f64, upper: f64, cdf: impl Fn(f64) -> f64) -> f64 {
    let mut k = 0.0;
    while k <= upper {
        if cdf(k) >= area {
            return k;
        }
        k += 1.0;
    }
    upper
}

// ---- registry entry points -----------------------------------------------

pub fn normalpdf(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("normalpdf", args, 1, 3)?;
    let x = util::f64_arg("normalpdf", args, 0)?;
    let u = util::f64_opt("normalpdf", args, 1, 0.0)?;
    let sigma = util::f64_opt("normalpdf", args, 2, 1.0)?;
    Ok(wrap(ctx, normal_pdf(x, u, sigma)))
}

pub fn normalcdf(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("normalcdf", args, 2, 4)?;
    let low = util::f64_arg("normalcdf", args, 0)?;
    let high = util::f64_arg("normalcdf", args, 1)?;
    let u = util::f64_opt("normalcdf", args, 2, 0.0)?;
    let sigma = util::f64_opt("normalcdf", args, 3, 1.0)?;
    Ok(wrap(
        ctx,
        normal_cdf_below(high, u, sigma) - normal_cdf_below(low, u, sigma),
    ))
}

pub fn inv_norm(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("invNorm", args, 1, 3)?;
    let area = util::f64_arg("invNorm", args, 0)?;
    let u = util::f64_opt("invNorm", args, 1, 0.0)?;
    let sigma = util::f64_opt("invNorm", args, 2, 1.0)?;
    check_area(area)?;
    Ok(wrap(ctx, u + sigma * norm_quantile(area)))
}

pub fn tpdf(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("tpdf", args, 2, 2)?;
    let x = util::f64_arg("tpdf", args, 0)?;
    let df = util::f64_arg("tpdf", args, 1)?;
    if df < 1.0 {
        return Err(EngineError::InvalidArgument(
            "df must be greater than 0".to_string(),
        ));
    }
    Ok(wrap(ctx, t_pdf(x, df)))
}

pub fn tcdf(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("tcdf", args, 3, 3)?;
    let low = util::f64_arg("tcdf", args, 0)?;
    let high = util::f64_arg("tcdf", args, 1)?;
    let df = util::f64_arg("tcdf", args, 2)?;
    if df < 1.0 {
        return Err(EngineError::InvalidArgument(
            "df must be greater than 0".to_string(),
        ));
    }
    Ok(wrap(ctx, t_cdf_below(high, df) - t_cdf_below(low, df)))
}

pub fn inv_t(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("invT", args, 2, 2)?;
    let area = util::f64_arg("invT", args, 0)?;
    let df = util::f64_arg("invT", args, 1)?;
    check_area(area)?;
    let x = invert_cdf(|x| t_cdf_below(x, df), -1e8, 1e8, area);
    Ok(wrap(ctx, x))
}

pub fn chi2pdf(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("chi2pdf", args, 2, 2)?;
    let x = util::f64_arg("chi2pdf", args, 0)?;
    let df = util::f64_arg("chi2pdf", args, 1)?;
    Ok(wrap(ctx, chi2_pdf(x, df)))
}

pub fn chi2cdf(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("chi2cdf", args, 3, 3)?;
    let low = util::f64_arg("chi2cdf", args, 0)?;
    let high = util::f64_arg("chi2cdf", args, 1)?;
    let df = util::f64_arg("chi2cdf", args, 2)?;
    Ok(wrap(ctx, chi2_cdf_below(high, df) - chi2_cdf_below(low, df)))
}

pub fn inv_chi2(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("invChi2", args, 2, 2)?;
    let area = util::f64_arg("invChi2", args, 0)?;
    let df = util::f64_arg("invChi2", args, 1)?;
    check_area(area)?;
    Ok(wrap(ctx, gamma_quantile(area, df / 2.0, 2.0)))
}

pub fn fpdf(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("Fpdf", args, 3, 3)?;
    let x = util::f64_arg("Fpdf", args, 0)?;
    let d1 = util::f64_arg("Fpdf", args, 1)?;
    let d2 = util::f64_arg("Fpdf", args, 2)?;
    Ok(wrap(ctx, f_pdf(x, d1, d2)))
}

pub fn fcdf(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("Fcdf", args, 4, 4)?;
    let low = util::f64_arg("Fcdf", args, 0)?;
    let high = util::f64_arg("Fcdf", args, 1)?;
    let d1 = util::f64_arg("Fcdf", args, 2)?;
    let d2 = util::f64_arg("Fcdf", args, 3)?;
    Ok(wrap(ctx, f_cdf_below(high, d1, d2) - f_cdf_below(low, d1, d2)))
}

pub fn inv_f(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("invF", args, 3, 3)?;
    let area = util::f64_arg("invF", args, 0)?;
    let d1 = util::f64_arg("invF", args, 1)?;
    let d2 = util::f64_arg("invF", args, 2)?;
    check_area(area)?;
    let mut hi = 10.0;
    while f_cdf_below(hi, d1, d2) < area && hi < 1e300 {
        hi *= 2.0;
    }
    Ok(wrap(ctx, invert_cdf(|x| f_cdf_below(x, d1, d2), 0.0, hi, area)))
}

pub fn betapdf(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("betapdf", args, 3, 3)?;
    let x = util::f64_arg("betapdf", args, 0)?;
    let a = util::f64_arg("betapdf", args, 1)?;
    let b = util::f64_arg("betapdf", args, 2)?;
    Ok(wrap(ctx, beta_pdf(x, a, b)))
}

pub fn betacdf(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("betacdf", args, 4, 4)?;
    let low = util::f64_arg("betacdf", args, 0)?;
    let high = util::f64_arg("betacdf", args, 1)?;
    let a = util::f64_arg("betacdf", args, 2)?;
    let b = util::f64_arg("betacdf", args, 3)?;
    Ok(wrap(ctx, beta_inc(a, b, high) - beta_inc(a, b, low)))
}

pub fn inv_beta(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("invBeta", args, 3, 3)?;
    let area = util::f64_arg("invBeta", args, 0)?;
    let a = util::f64_arg("invBeta", args, 1)?;
    let b = util::f64_arg("invBeta", args, 2)?;
    check_area(area)?;
    Ok(wrap(ctx, invert_cdf(|x| beta_inc(a, b, x), 0.0, 1.0, area)))
}

pub fn exponentialpdf(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("exponentialpdf", args, 2, 2)?;
    let x = util::f64_arg("exponentialpdf", args, 0)?;
    let lambda = util::f64_arg("exponentialpdf", args, 1)?;
    let out = if x < 0.0 { 0.0 } else { lambda * (-lambda * x).exp() };
    Ok(wrap(ctx, out))
}

pub fn exponentialcdf(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("exponentialcdf", args, 3, 3)?;
    let low = util::f64_arg("exponentialcdf", args, 0)?;
    let high = util::f64_arg("exponentialcdf", args, 1)?;
    let lambda = util::f64_arg("exponentialcdf", args, 2)?;
    let below = |x: f64| if x <= 0.0 { 0.0 } else { 1.0 - (-lambda * x).exp() };
    Ok(wrap(ctx, below(high) - below(low)))
}

pub fn inv_exp(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("invExp", args, 2, 2)?;
    let area = util::f64_arg("invExp", args, 0)?;
    let lambda = util::f64_arg("invExp", args, 1)?;
    check_area(area)?;
    Ok(wrap(ctx, -(1.0 - area).ln() / lambda))
}

pub fn binomialpdf(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("binomialpdf", args, 3, 3)?;
    let trials = util::f64_arg("binomialpdf", args, 0)?;
    let p = util::f64_arg("binomialpdf", args, 1)?;
    let x = util::f64_arg("binomialpdf", args, 2)?;
    check_prob(p)?;
    Ok(wrap(ctx, binomial_pdf(x, trials, p)))
}

pub fn binomialcdf(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("binomialcdf", args, 3, 3)?;
    let trials = util::f64_arg("binomialcdf", args, 0)?;
    let p = util::f64_arg("binomialcdf", args, 1)?;
    let x = util::f64_arg("binomialcdf", args, 2)?;
    check_prob(p)?;
    Ok(wrap(ctx, binomial_cdf(x, trials, p)))
}

pub fn inv_bin(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("invBin", args, 3, 3)?;
    let area = util::f64_arg("invBin", args, 0)?;
    let trials = util::f64_arg("invBin", args, 1)?;
    let p = util::f64_arg("invBin", args, 2)?;
    check_prob(p)?;
    check_area(area)?;
    Ok(wrap(
        ctx,
        discrete_quantile(area, trials, |k| binomial_cdf(k, trials, p)),
    ))
}

pub fn poissonpdf(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("poissonpdf", args, 2, 2)?;
    let x = util::f64_arg("poissonpdf", args, 0)?;
    let lambda = util::f64_arg("poissonpdf", args, 1)?;
    Ok(wrap(ctx, poisson_pdf(x, lambda)))
}

pub fn poissoncdf(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("poissoncdf", args, 2, 2)?;
    let x = util::f64_arg("poissoncdf", args, 0)?;
    let lambda = util::f64_arg("poissoncdf", args, 1)?;
    Ok(wrap(ctx, poisson_cdf(x, lambda)))
}

pub fn inv_poisson(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("invPoisson", args, 2, 2)?;
    let area = util::f64_arg("invPoisson", args, 0)?;
    let lambda = util::f64_arg("invPoisson", args, 1)?;
    check_area(area)?;
    let upper = lambda + 20.0 * lambda.sqrt() + 100.0;
    Ok(wrap(
        ctx,
        discrete_quantile(area, upper, |k| poisson_cdf(k, lambda)),
    ))
}

pub fn gammapdf(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("gammapdf", args, 3, 3)?;
    let x = util::f64_arg("gammapdf", args, 0)?;
    let shape = util::f64_arg("gammapdf", args, 1)?;
    let scale = util::f64_arg("gammapdf", args, 2)?;
    Ok(wrap(ctx, gamma_pdf(x, shape, scale)))
}

pub fn gammacdf(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("gammacdf", args, 4, 4)?;
    let low = util::f64_arg("gammacdf", args, 0)?;
    let high = util::f64_arg("gammacdf", args, 1)?;
    let shape = util::f64_arg("gammacdf", args, 2)?;
    let scale = util::f64_arg("gammacdf", args, 3)?;
    Ok(wrap(
        ctx,
        gamma_cdf_below(high, shape, scale) - gamma_cdf_below(low, shape, scale),
    ))
}

pub fn inv_gamma(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("invGamma", args, 3, 3)?;
    let area = util::f64_arg("invGamma", args, 0)?;
    let shape = util::f64_arg("invGamma", args, 1)?;
    let scale = util::f64_arg("invGamma", args, 2)?;
    check_area(area)?;
    Ok(wrap(ctx, gamma_quantile(area, shape, scale)))
}

pub fn hypergeometricpdf(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("hypergeometricpdf", args, 4, 4)?;
    let k = util::f64_arg("hypergeometricpdf", args, 0)?;
    let draws = util::f64_arg("hypergeometricpdf", args, 1)?;
    let succ = util::f64_arg("hypergeometricpdf", args, 2)?;
    let total = util::f64_arg("hypergeometricpdf", args, 3)?;
    Ok(wrap(ctx, hypergeometric_pdf(k, draws, succ, total)))
}

pub fn hypergeometriccdf(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("hypergeometriccdf", args, 4, 4)?;
    let k = util::f64_arg("hypergeometriccdf", args, 0)?;
    let draws = util::f64_arg("hypergeometriccdf", args, 1)?;
    let succ = util::f64_arg("hypergeometriccdf", args, 2)?;
    let total = util::f64_arg("hypergeometriccdf", args, 3)?;
    Ok(wrap(ctx, hypergeometric_cdf(k, draws, succ, total)))
}

pub fn inv_hypergeo(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("invHypergeo", args, 4, 4)?;
    let area = util::f64_arg("invHypergeo", args, 0)?;
    let draws = util::f64_arg("invHypergeo", args, 1)?;
    let succ = util::f64_arg("invHypergeo", args, 2)?;
    let total = util::f64_arg("invHypergeo", args, 3)?;
    check_area(area)?;
    Ok(wrap(
        ctx,
        discrete_quantile(area, draws, |k| hypergeometric_cdf(k, draws, succ, total)),
    ))
}

pub fn geometricpdf(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("geometricpdf", args, 2, 2)?;
    let p = util::f64_arg("geometricpdf", args, 0)?;
    let x = util::f64_arg("geometricpdf", args, 1)?.floor();
    check_prob(p)?;
    if x <= 0.0 {
        return Err(EngineError::InvalidArgument(
            "x must be greater than 0".to_string(),
        ));
    }
    Ok(wrap(ctx, p * (1.0 - p).powf(x - 1.0)))
}

pub fn geometriccdf(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("geometriccdf", args, 2, 2)?;
    let p = util::f64_arg("geometriccdf", args, 0)?;
    let x = util::f64_arg("geometriccdf", args, 1)?.floor();
    check_prob(p)?;
    if x <= 0.0 {
        return Err(EngineError::InvalidArgument(
            "x must be greater than 0".to_string(),
        ));
    }
    let r = 1.0 - p;
    Ok(wrap(ctx, p * (r.powf(x + 1.0) - 1.0) / (r - 1.0)))
}

pub fn inv_geo(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("invGeo", args, 2, 2)?;
    let p = util::f64_arg("invGeo", args, 0)?;
    let prob = util::f64_arg("invGeo", args, 1)?;
    check_prob(prob)?;
    if p <= 0.0 || p > 1.0 {
        return Err(EngineError::InvalidArgument(
            "0 < p < 1 must be true".to_string(),
        ));
    }
    let r = 1.0 - prob;
    let x = ((p * (r - 1.0) / prob + 1.0).ln() / r.ln() - 1.0).ceil();
    Ok(wrap(ctx, x))
}

pub fn cauchypdf(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("cauchypdf", args, 1, 3)?;
    let x = util::f64_arg("cauchypdf", args, 0)?;
    let x0 = util::f64_opt("cauchypdf", args, 1, 0.0)?;
    let scale = util::f64_opt("cauchypdf", args, 2, 1.0)?;
    let d = x - x0;
    Ok(wrap(
        ctx,
        1.0 / (std::f64::consts::PI * scale) * (scale * scale) / (d * d + scale * scale),
    ))
}

pub fn cauchycdf(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("cauchycdf", args, 1, 3)?;
    let x = util::f64_arg("cauchycdf", args, 0)?;
    let x0 = util::f64_opt("cauchycdf", args, 1, 0.0)?;
    let scale = util::f64_opt("cauchycdf", args, 2, 1.0)?;
    Ok(wrap(
        ctx,
        (x - x0).atan2(scale) / std::f64::consts::PI + 0.5,
    ))
}

pub fn inv_cauchy(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("invCauchy", args, 1, 3)?;
    let area = util::f64_arg("invCauchy", args, 0)?;
    let x0 = util::f64_opt("invCauchy", args, 1, 0.0)?;
    let scale = util::f64_opt("invCauchy", args, 2, 1.0)?;
    Ok(wrap(
        ctx,
        x0 + scale * (std::f64::consts::PI * (area - 0.5)).tan(),
    ))
}

pub fn z_score(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("zScore", args, 3, 3)?;
    let x = util::f64_arg("zScore", args, 0)?;
    let mean = util::f64_arg("zScore", args, 1)?;
    let sigma = util::f64_arg("zScore", args, 2)?;
    Ok(wrap(ctx, (x - mean) / sigma))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() < tol, "{} vs {}", a, b);
    }

    #[test]
    fn normal_reference_values() {
        close(normal_pdf(0.0, 0.0, 1.0), 0.398_942_280_401_432_7, 1e-12);
        close(
            normal_cdf_below(1.0, 0.0, 1.0) - normal_cdf_below(-1.0, 0.0, 1.0),
            0.682_689_492_137,
            1e-9,
        );
    }

    #[test]
    fn t_distribution_df1_is_cauchy() {
        close(t_pdf(0.0, 1.0), 1.0 / std::f64::consts::PI, 1e-10);
        close(t_cdf_below(1.0, 1.0), 0.75, 1e-9);
        let q = invert_cdf(|x| t_cdf_below(x, 1.0), -1e8, 1e8, 0.75);
        close(q, 1.0, 1e-6);
    }

    #[test]
    fn chi2_df2_is_exponential() {
        close(chi2_cdf_below(2.0, 2.0), 1.0 - (-1.0f64).exp(), 1e-10);
        close(chi2_pdf(2.0, 2.0), 0.5 * (-1.0f64).exp(), 1e-10);
    }

    #[test]
    fn f_distribution_2_2() {
        // For d1 = d2 = 2 the cdf is x / (x + 1)
        close(f_cdf_below(1.0, 2.0, 2.0), 0.5, 1e-9);
        close(f_cdf_below(3.0, 2.0, 2.0), 0.75, 1e-9);
    }

    #[test]
    fn discrete_families() {
        close(binomial_pdf(5.0, 10.0, 0.5), 252.0 / 1024.0, 1e-10);
        close(binomial_cdf(5.0, 10.0, 0.5), 0.623_046_875, 1e-9);
        close(poisson_pdf(2.0, 3.0), (-3.0f64).exp() * 4.5, 1e-10);
        close(hypergeometric_pdf(1.0, 2.0, 2.0, 5.0), 0.6, 1e-10);
    }

    #[test]
    fn quantiles_agree_with_cdfs() {
        let k = discrete_quantile(0.62, 10.0, |k| binomial_cdf(k, 10.0, 0.5));
        assert_eq!(k, 5.0);
        close(gamma_quantile(0.5, 1.0, 2.0), 2.0 * std::f64::consts::LN_2, 1e-8);
    }
}
