//! Registration table for the whole function library.

use crate::{calculus, display, dist, numtheory, poly, random, special, stats, util};
use calc_engine::{CalcResult, EvalContext, FunctionDef, Registry, Value};

/// gamma(x): the gamma function; also the non-integer factorial
/// backend.
fn gamma_fn(ctx: &mut EvalContext, args: &[Value]) -> CalcResult<Value> {
    util::require("gamma", args, 1, 1)?;
    let x = util::f64_arg("gamma", args, 0)?;
    Ok(Value::Number(ctx.mode.from_f64(special::gamma(x))))
}

const DEFS: &[FunctionDef] = &[
    // Calculus
    FunctionDef {
        name: "derivative",
        params: "expr, [var], [point], [order]",
        help: "Differentiate an expression, optionally at a point",
        func: calculus::derivative,
    },
    FunctionDef {
        name: "gradient",
        params: "expr, [point], [vars]",
        help: "Vector of partial derivatives",
        func: calculus::gradient,
    },
    FunctionDef {
        name: "limit",
        params: "expr, point, [dir]",
        help: "Two-sided or one-sided limit at a point",
        func: calculus::limit,
    },
    FunctionDef {
        name: "taylorSeries",
        params: "expr, [center], [terms], [point]",
        help: "Taylor expansion around a center",
        func: calculus::taylor_series,
    },
    FunctionDef {
        name: "summation",
        params: "expr, start, end, [inc], [var]",
        help: "Sum of an expression over a range",
        func: calculus::summation,
    },
    FunctionDef {
        name: "seriesProduct",
        params: "expr, start, end, [inc], [var]",
        help: "Product of an expression over a range",
        func: calculus::series_product,
    },
    FunctionDef {
        name: "integral",
        params: "expr, [start], [end], [var]",
        help: "Definite or symbolic antiderivative",
        func: calculus::integral,
    },
    FunctionDef {
        name: "riemann",
        params: "expr, start, end, divisions, [corner]",
        help: "Riemann sum with left, right or middle samples",
        func: calculus::riemann,
    },
    FunctionDef {
        name: "newtonRaphson",
        params: "expr, guess, [var]",
        help: "Root finding from an initial guess",
        func: calculus::newton_raphson,
    },
    FunctionDef {
        name: "fmin",
        params: "expr, start, end, [var], [maxError]",
        help: "Local minimum on an interval",
        func: calculus::fmin,
    },
    FunctionDef {
        name: "fmax",
        params: "expr, start, end, [var], [maxError]",
        help: "Local maximum on an interval",
        func: calculus::fmax,
    },
    FunctionDef {
        name: "curl",
        params: "field, [point], [vars]",
        help: "Curl of a 2 or 3 component vector field",
        func: calculus::curl,
    },
    FunctionDef {
        name: "div",
        params: "field, [point], [vars]",
        help: "Divergence of a vector field",
        func: calculus::divergence,
    },
    FunctionDef {
        name: "lagrangeErrorBound",
        params: "expr, x, center, degree",
        help: "Taylor remainder bound",
        func: calculus::lagrange_error_bound,
    },
    FunctionDef {
        name: "partfrac",
        params: "expr, [var]",
        help: "Partial fraction decomposition",
        func: poly::partfrac,
    },
    // Special and continuous distributions
    FunctionDef {
        name: "gamma",
        params: "x",
        help: "Gamma function",
        func: gamma_fn,
    },
    FunctionDef {
        name: "normalpdf",
        params: "x, [mean], [stdev]",
        help: "Normal density",
        func: dist::normalpdf,
    },
    FunctionDef {
        name: "normalcdf",
        params: "low, high, [mean], [stdev]",
        help: "Normal area between low and high",
        func: dist::normalcdf,
    },
    FunctionDef {
        name: "invNorm",
        params: "area, [mean], [stdev]",
        help: "Normal quantile",
        func: dist::inv_norm,
    },
    FunctionDef {
        name: "tpdf",
        params: "x, df",
        help: "Student t density",
        func: dist::tpdf,
    },
    FunctionDef {
        name: "tcdf",
        params: "low, high, df",
        help: "Student t area between low and high",
        func: dist::tcdf,
    },
    FunctionDef {
        name: "invT",
        params: "area, df",
        help: "Student t quantile",
        func: dist::inv_t,
    },
    FunctionDef {
        name: "chi2pdf",
        params: "x, df",
        help: "Chi-squared density",
        func: dist::chi2pdf,
    },
    FunctionDef {
        name: "chi2cdf",
        params: "low, high, df",
        help: "Chi-squared area between low and high",
        func: dist::chi2cdf,
    },
    FunctionDef {
        name: "invChi2",
        params: "area, df",
        help: "Chi-squared quantile",
        func: dist::inv_chi2,
    },
    FunctionDef {
        name: "Fpdf",
        params: "x, df1, df2",
        help: "F density",
        func: dist::fpdf,
    },
    FunctionDef {
        name: "Fcdf",
        params: "low, high, df1, df2",
        help: "F area between low and high",
        func: dist::fcdf,
    },
    FunctionDef {
        name: "invF",
        params: "area, df1, df2",
        help: "F quantile",
        func: dist::inv_f,
    },
    FunctionDef {
        name: "betapdf",
        params: "x, alpha, beta",
        help: "Beta density",
        func: dist::betapdf,
    },
    FunctionDef {
        name: "betacdf",
        params: "low, high, alpha, beta",
        help: "Beta area between low and high",
        func: dist::betacdf,
    },
    FunctionDef {
        name: "invBeta",
        params: "area, alpha, beta",
        help: "Beta quantile",
        func: dist::inv_beta,
    },
    FunctionDef {
        name: "exponentialpdf",
        params: "x, rate",
        help: "Exponential density",
        func: dist::exponentialpdf,
    },
    FunctionDef {
        name: "exponentialcdf",
        params: "low, high, rate",
        help: "Exponential area between low and high",
        func: dist::exponentialcdf,
    },
    FunctionDef {
        name: "invExponential",
        params: "area, rate",
        help: "Exponential quantile",
        func: dist::inv_exp,
    },
    FunctionDef {
        name: "gammapdf",
        params: "x, shape, scale",
        help: "Gamma density",
        func: dist::gammapdf,
    },
    FunctionDef {
        name: "gammacdf",
        params: "low, high, shape, scale",
        help: "Gamma area between low and high",
        func: dist::gammacdf,
    },
    FunctionDef {
        name: "invGamma",
        params: "area, shape, scale",
        help: "Gamma quantile",
        func: dist::inv_gamma,
    },
    FunctionDef {
        name: "cauchypdf",
        params: "x, [location], [scale]",
        help: "Cauchy density",
        func: dist::cauchypdf,
    },
    FunctionDef {
        name: "cauchycdf",
        params: "x, [location], [scale]",
        help: "Cauchy area below x",
        func: dist::cauchycdf,
    },
    FunctionDef {
        name: "invCauchy",
        params: "area, [location], [scale]",
        help: "Cauchy quantile",
        func: dist::inv_cauchy,
    },
    // Discrete distributions
    FunctionDef {
        name: "binomialpdf",
        params: "trials, probSuccess, x",
        help: "Binomial probability of exactly x successes",
        func: dist::binomialpdf,
    },
    FunctionDef {
        name: "binomialcdf",
        params: "trials, probSuccess, x",
        help: "Binomial probability of at most x successes",
        func: dist::binomialcdf,
    },
    FunctionDef {
        name: "invBinomial",
        params: "area, trials, probSuccess",
        help: "Binomial quantile",
        func: dist::inv_bin,
    },
    FunctionDef {
        name: "poissonpdf",
        params: "x, mean",
        help: "Poisson probability of exactly x events",
        func: dist::poissonpdf,
    },
    FunctionDef {
        name: "poissoncdf",
        params: "x, mean",
        help: "Poisson probability of at most x events",
        func: dist::poissoncdf,
    },
    FunctionDef {
        name: "invPoisson",
        params: "area, mean",
        help: "Poisson quantile",
        func: dist::inv_poisson,
    },
    FunctionDef {
        name: "geometricpdf",
        params: "probSuccess, x",
        help: "Geometric probability of first success on trial x",
        func: dist::geometricpdf,
    },
    FunctionDef {
        name: "geometriccdf",
        params: "probSuccess, x",
        help: "Geometric probability within x trials",
        func: dist::geometriccdf,
    },
    FunctionDef {
        name: "invGeometric",
        params: "area, probSuccess",
        help: "Geometric quantile",
        func: dist::inv_geo,
    },
    FunctionDef {
        name: "hypergeometricpdf",
        params: "x, draws, successPop, totalPop",
        help: "Hypergeometric probability of exactly x successes",
        func: dist::hypergeometricpdf,
    },
    FunctionDef {
        name: "hypergeometriccdf",
        params: "x, draws, successPop, totalPop",
        help: "Hypergeometric probability of at most x successes",
        func: dist::hypergeometriccdf,
    },
    FunctionDef {
        name: "invHypergeometric",
        params: "area, draws, successPop, totalPop",
        help: "Hypergeometric quantile",
        func: dist::inv_hypergeo,
    },
    FunctionDef {
        name: "zScore",
        params: "x, mean, stdev",
        help: "Standard score",
        func: dist::z_score,
    },
    // Statistics
    FunctionDef {
        name: "summary",
        params: "list",
        help: "Mean, median, min, max and stdev of a list",
        func: stats::summary,
    },
    FunctionDef {
        name: "percentDiff",
        params: "experimental, trueValue",
        help: "Relative error against the true value",
        func: stats::percent_diff,
    },
    // Random
    FunctionDef {
        name: "randInt",
        params: "low, high, [count]",
        help: "Uniform random integers, inclusive",
        func: random::rand_int,
    },
    FunctionDef {
        name: "uniform",
        params: "[low], [high]",
        help: "Uniform random float",
        func: random::uniform,
    },
    FunctionDef {
        name: "randNorm",
        params: "[mean], [stdev]",
        help: "Normally distributed random float",
        func: random::rand_norm,
    },
    // Number theory
    FunctionDef {
        name: "factor",
        params: "n",
        help: "Prime factorization",
        func: numtheory::factorization,
    },
    FunctionDef {
        name: "divisorCount",
        params: "n",
        help: "Number of positive divisors",
        func: numtheory::divisor_count,
    },
    FunctionDef {
        name: "divisorSum",
        params: "n",
        help: "Sum of positive divisors",
        func: numtheory::divisor_sum,
    },
    FunctionDef {
        name: "powMod",
        params: "base, exponent, m",
        help: "Modular exponentiation",
        func: numtheory::pow_mod,
    },
    FunctionDef {
        name: "geoSumMod",
        params: "n, b, m",
        help: "Geometric series 1 + b + ... + b^n mod m",
        func: numtheory::geo_sum_mod,
    },
    // Presentation
    FunctionDef {
        name: "toFraction",
        params: "x, [maxError]",
        help: "Closest small fraction as a string",
        func: display::to_fraction,
    },
    FunctionDef {
        name: "toMixedFraction",
        params: "x, [maxError]",
        help: "Closest mixed fraction as a string",
        func: display::to_mixed_fraction,
    },
    FunctionDef {
        name: "dms",
        params: "angle",
        help: "Degrees as degrees, minutes and seconds",
        func: display::dms,
    },
    FunctionDef {
        name: "numberName",
        params: "n",
        help: "English name of an integer",
        func: display::number_name,
    },
    FunctionDef {
        name: "seconds",
        params: "s",
        help: "Seconds as a humanized duration",
        func: display::seconds,
    },
];

/// Register the library on top of the engine's math primitives.
pub fn register_all(reg: &mut Registry) {
    for def in DEFS {
        reg.register(*def);
    }
    reg.alias("randomInt", "randInt");
    reg.alias("primeFactors", "factor");
    reg.alias("primeFactorization", "factor");
    reg.alias("factorization", "factor");
    reg.alias("perDiff", "percentDiff");
    reg.alias("percentDifference", "percentDiff");
    reg.alias("powerMod", "powMod");
    reg.alias("factorCount", "divisorCount");
    reg.alias("factorSum", "divisorSum");
    reg.alias("Riemann", "riemann");
    reg.alias("invBin", "invBinomial");
    reg.alias("invGeo", "invGeometric");
    reg.alias("invExp", "invExponential");
    reg.alias("toFrac", "toFraction");
    reg.alias("toDMS", "dms");
}

#[cfg(test)]
mod tests {
    use super::*;
    use calc_engine::builtins;

    #[test]
    fn everything_registers_without_collisions() {
        let mut reg = Registry::new();
        builtins::register(&mut reg);
        register_all(&mut reg);
        for name in ["derivative", "invNorm", "summary", "randInt", "powMod", "gamma"] {
            assert!(reg.get(name).is_some(), "{} missing", name);
        }
        // Aliases resolve to the same entry point
        let a = reg.get("factor").map(|d| d.func as usize);
        let b = reg.get("primeFactors").map(|d| d.func as usize);
        assert_eq!(a, b);
    }

    #[test]
    fn names_preserve_registration_order() {
        let mut reg = Registry::new();
        register_all(&mut reg);
        let names = reg.names();
        let d = names.iter().position(|n| *n == "derivative");
        let g = names.iter().position(|n| *n == "geoSumMod");
        assert!(d < g);
    }
}
