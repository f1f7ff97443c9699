use pyo3::prelude::*;
#[pymodule]
mod _core {
    use libbytemap::{
        AttrValue, Data, Dataset as ID, Product, ReaderConfig, Variable as IV, errors::Error,
    };
    use numpy::IntoPyArray;
    use pyo3::{IntoPyObjectExt, prelude::*, types::PyDict};

    fn to_pyerr(e: Error) -> PyErr {
        match e {
            Error::Io(io_err) => {
                PyErr::new::<pyo3::exceptions::PyIOError, _>(format!("IO Error: {}", io_err))
            }

            e @ Error::FileUnreadable { .. } => {
                PyErr::new::<pyo3::exceptions::PyIOError, _>(e.to_string())
            }

            e @ (Error::ShapeMismatch { .. } | Error::DimensionMismatch { .. }) => {
                PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string())
            }

            e => PyErr::new::<pyo3::exceptions::PyException, _>(e.to_string()),
        }
    }

    fn open(product: Product, filename: &str, missing: Option<f64>) -> PyResult<ID> {
        let config = ReaderConfig::default().with_missing(missing);
        ID::open(product, filename, &config).map_err(to_pyerr)
    }

    fn attr_value(py: Python<'_>, value: AttrValue) -> PyResult<Py<PyAny>> {
        match value {
            AttrValue::Float(v) => v.into_py_any(py),
            AttrValue::Int(v) => v.into_py_any(py),
            AttrValue::Bool(v) => v.into_py_any(py),
        }
    }

    fn dimensions<'py>(py: Python<'py>, dataset: &ID) -> PyResult<Bound<'py, PyDict>> {
        let dict = PyDict::new(py);
        for (name, len) in dataset.dimensions().iter() {
            dict.set_item(name, len)?;
        }
        Ok(dict)
    }

    fn variables<'py>(py: Python<'py>, dataset: &ID) -> PyResult<Bound<'py, PyDict>> {
        let dict = PyDict::new(py);
        for variable in dataset.variables() {
            dict.set_item(variable.name(), Variable(variable.clone()))?;
        }
        Ok(dict)
    }

    #[pyclass]
    struct Variable(IV);

    #[pymethods]
    impl Variable {
        fn __repr__(&self) -> String {
            format!(
                "Variable {} ({}) [{}] valid={}..{} shape={:?}",
                self.0.name(),
                self.0.attributes().long_name,
                self.0.attributes().units,
                self.0.attributes().valid_min,
                self.0.attributes().valid_max,
                self.0.shape()
            )
        }

        #[getter]
        fn name(&self) -> &str {
            self.0.name()
        }

        #[getter]
        fn long_name(&self) -> &str {
            self.0.attributes().long_name
        }

        #[getter]
        fn units(&self) -> &str {
            self.0.attributes().units
        }

        #[getter]
        fn coordinates(&self) -> Vec<&'static str> {
            self.0.attributes().coordinates.clone()
        }

        #[getter]
        fn valid_min(&self, py: Python<'_>) -> PyResult<Py<PyAny>> {
            attr_value(py, self.0.attributes().valid_min)
        }

        #[getter]
        fn valid_max(&self, py: Python<'_>) -> PyResult<Py<PyAny>> {
            attr_value(py, self.0.attributes().valid_max)
        }

        #[getter]
        fn shape(&self) -> Vec<usize> {
            self.0.shape().to_vec()
        }

        #[getter]
        fn values(&self, py: Python<'_>) -> PyResult<Py<PyAny>> {
            match self.0.data() {
                Data::Float(a) => a.clone().into_pyarray(py).into_py_any(py),
                Data::Mask(a) => a.clone().into_pyarray(py).into_py_any(py),
            }
        }
    }

    macro_rules! dataset_class {
        ($(($class:ident, $product:expr)),+$(,)?) => {
            $(
                #[pyclass]
                struct $class {
                    inner: ID,
                }

                #[pymethods]
                impl $class {
                    #[new]
                    #[pyo3(signature = (filename, missing = Some(-999.0)))]
                    fn new(filename: &str, missing: Option<f64>) -> PyResult<Self> {
                        Ok($class {
                            inner: open($product, filename, missing)?,
                        })
                    }

                    fn __repr__(&self) -> String {
                        format!(
                            "{} {} with {} variables",
                            self.inner.product(),
                            self.inner.filename().display(),
                            self.inner.variables().len()
                        )
                    }

                    #[getter]
                    fn filename(&self) -> String {
                        self.inner.filename().to_string_lossy().to_string()
                    }

                    #[getter]
                    fn missing(&self) -> Option<f64> {
                        self.inner.missing()
                    }

                    #[getter]
                    fn dimensions<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
                        dimensions(py, &self.inner)
                    }

                    #[getter]
                    fn variables<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
                        variables(py, &self.inner)
                    }
                }
            )+
        };
    }

    dataset_class!(
        (QuikScatDaily, Product::QuikScatDaily),
        (QuikScatAveraged, Product::QuikScatAveraged),
    );

    // classes expanded from `dataset_class!` are not picked up automatically
    #[pymodule_init]
    fn init(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_class::<QuikScatDaily>()?;
        m.add_class::<QuikScatAveraged>()?;
        Ok(())
    }
}
